#[cfg(test)]
#[macro_use]
extern crate assert_matches;
#[macro_use]
extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate usrarp;

use usrarp::core::repr::Ipv4Address;

lazy_static! {
    /// The IPv4 address the responder claims.
    static ref HOST_IPV4_ADDR: Ipv4Address = Ipv4Address::new([172, 44, 0, 2]);
}

#[cfg(target_os = "linux")]
mod platform {
    use std::time::Duration;

    use clap::{
        App,
        Arg,
        ArgMatches,
    };

    use usrarp::core::dev::Device;
    use usrarp::core::repr::EthernetAddress;
    use usrarp::core::service::{
        Mode,
        Service,
    };
    use usrarp::core::source::{
        InterruptSource,
        PollingSource,
        DEFAULT_RX_RING_LEN,
    };
    use usrarp::core::storage::{
        Pool,
        FRAME_CAPACITY,
    };
    use usrarp::linux::dev::Tap;
    use usrarp::Result;

    pub fn app<'a, 'b>() -> App<'a, 'b> {
        App::new("arp_responder")
            .about("Answers ARP requests on a Linux TAP interface, or dumps every frame.")
            .arg(
                Arg::with_name("tap")
                    .long("tap")
                    .value_name("TAP")
                    .help("Linux TAP interface")
                    .default_value("tap0")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("dev-mac")
                    .long("dev-mac")
                    .value_name("MAC")
                    .help("MAC address to answer with instead of the TAP's own")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("mode")
                    .long("mode")
                    .value_name("MODE")
                    .help("Answer ARP requests or hex dump every frame")
                    .possible_values(&["arp", "dump"])
                    .default_value("arp")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("dispatch")
                    .long("dispatch")
                    .value_name("DISPATCH")
                    .help("Poll the device on an interval or wait for it to become readable")
                    .possible_values(&["poll", "interrupt"])
                    .default_value("poll")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("interval")
                    .long("interval")
                    .value_name("MS")
                    .help("Milliseconds to sleep between polls")
                    .default_value("10")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("rx-buffers")
                    .long("rx-buffers")
                    .value_name("COUNT")
                    .help("Receive buffers kept posted on the device")
                    .validator(positive_count)
                    .takes_value(true),
            )
    }

    /// Accepts counts of at least one, since a responder with no receive
    /// buffers never sees a frame.
    fn positive_count(value: String) -> std::result::Result<(), String> {
        match value.parse::<usize>() {
            Ok(0) => Err(String::from("must be at least 1")),
            Ok(_) => Ok(()),
            Err(err) => Err(err.to_string()),
        }
    }

    pub fn run(matches: &ArgMatches) -> Result<()> {
        let mut tap = Tap::new(matches.value_of("tap").unwrap_or("tap0"))?;

        if matches.is_present("dev-mac") {
            let eth_addr = value_t!(matches, "dev-mac", EthernetAddress).unwrap_or_else(|e| e.exit());
            tap = tap.with_ethernet_addr(eth_addr);
        }

        let mode = match matches.value_of("mode") {
            Some("dump") => Mode::Dump,
            _ => Mode::Respond,
        };

        let rx_buffers = if matches.is_present("rx-buffers") {
            value_t!(matches, "rx-buffers", usize).unwrap_or_else(|e| e.exit())
        } else {
            DEFAULT_RX_RING_LEN
        };

        let interval = value_t!(matches, "interval", u64).unwrap_or_else(|e| e.exit());

        info!(
            "Device: (MTU = {}, MAC = {}, IPv4 = {})",
            tap.max_transmission_unit(),
            tap.ethernet_addr(),
            *super::HOST_IPV4_ADDR
        );

        // Twice the ring so replies in flight never starve reception.
        let pool = Pool::new(rx_buffers.saturating_mul(2), tap.headroom(), FRAME_CAPACITY);

        match matches.value_of("dispatch") {
            Some("interrupt") => {
                let source = InterruptSource::new(tap, pool, rx_buffers);
                Service::new(source, *super::HOST_IPV4_ADDR, mode).run_interrupt(None)
            }
            _ => {
                let source = PollingSource::new(tap, pool, rx_buffers);
                Service::new(source, *super::HOST_IPV4_ADDR, mode)
                    .run(Duration::from_millis(interval))
            }
        }
    }
}


#[cfg(target_os = "linux")]
fn main() {
    env_logger::init();

    let matches = platform::app().get_matches();

    if let Err(err) = platform::run(&matches) {
        error!("Responder stopped with {:?}.", err);
        std::process::exit(1);
    }
}

#[cfg(not(target_os = "linux"))]
fn main() {
    env_logger::init();

    error!(
        "Sorry, the responder for {} only runs on Linux.",
        *HOST_IPV4_ADDR
    );
    std::process::exit(1);
}
