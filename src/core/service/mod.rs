//! Packet processing services.
//!
//! A Service pulls frames from a PacketSource and either answers ARP requests
//! for its host or dumps the frames to the log.

pub mod arp;

use std::thread;
use std::time::Duration;

pub use self::arp::{
    handle,
    inspect,
    Action,
    Host,
    Ignored,
};

use crate::core::dev::Device;
use crate::core::dump::HexDump;
use crate::core::repr::Ipv4Address;
use crate::core::source::{
    InterruptSource,
    PacketSource,
    Recv,
    Transmit,
};
use crate::core::storage::{
    BufferAllocator,
    FrameBuffer,
};
use crate::Result;

/// Time to sleep between polls of a PollingSource.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// What a Service does with received frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Answer ARP requests for the host and drop everything else.
    Respond,
    /// Log a hex dump of every frame and drop it.
    Dump,
}

/// Frame counters kept by a Service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Frames received from the source.
    pub received: u64,
    /// ARP replies transmitted.
    pub replied: u64,
    /// Frames released without a reply.
    pub discarded: u64,
    /// Frames dumped to the log.
    pub dumped: u64,
    /// Transmit attempts that found the ring full.
    pub tx_retries: u64,
}

/// Drives a PacketSource on behalf of a host.
pub struct Service<S: PacketSource> {
    source: S,
    host: Host,
    mode: Mode,
    stats: Stats,
}

impl<S: PacketSource> Service<S> {
    /// Creates a service answering for ipv4_addr with the Ethernet address of
    /// the source's device.
    pub fn new(source: S, ipv4_addr: Ipv4Address, mode: Mode) -> Service<S> {
        let host = Host::new(source.ethernet_addr(), ipv4_addr);

        Service {
            source,
            host,
            mode,
            stats: Stats::default(),
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Processes a single frame taken from the source.
    pub fn process(&mut self, frame: FrameBuffer) -> Result<()> {
        process(
            &mut self.source,
            &self.host,
            self.mode,
            &mut self.stats,
            frame,
        )
    }

    /// Processes frames until the source runs dry or reports that nothing
    /// else is pending.
    ///
    /// # Returns
    ///
    /// The number of frames processed, or an unrecoverable device error.
    pub fn poll(&mut self) -> Result<usize> {
        let mut processed = 0;

        loop {
            match self.source.receive_one()? {
                Recv::More(frame) => {
                    processed += 1;
                    self.process(frame)?;
                }
                Recv::Frame(frame) => {
                    processed += 1;
                    self.process(frame)?;
                    break;
                }
                Recv::Empty => break,
            }
        }

        Ok(processed)
    }

    /// Polls the source forever, sleeping for interval between polls.
    ///
    /// Only returns on an unrecoverable device error.
    pub fn run(&mut self, interval: Duration) -> Result<()> {
        loop {
            self.poll()?;
            thread::sleep(interval);
        }
    }
}

impl<D: Device, A: BufferAllocator> Service<InterruptSource<D, A>> {
    /// Waits up to timeout for the device to signal frames and processes
    /// everything it delivers.
    pub fn dispatch(&mut self, timeout: Option<Duration>) -> Result<usize> {
        let host = self.host;
        let mode = self.mode;
        let stats = &mut self.stats;

        self.source.dispatch(timeout, |source, frame| {
            process(source, &host, mode, stats, frame)
        })
    }

    /// Dispatches frames forever.
    ///
    /// Only returns on an unrecoverable device error.
    pub fn run_interrupt(&mut self, timeout: Option<Duration>) -> Result<()> {
        loop {
            self.dispatch(timeout)?;
        }
    }
}

fn process<S: PacketSource>(
    source: &mut S,
    host: &Host,
    mode: Mode,
    stats: &mut Stats,
    frame: FrameBuffer,
) -> Result<()> {
    stats.received += 1;

    match mode {
        Mode::Dump => {
            info!("Received {} byte frame:\n{}", frame.len(), HexDump(&frame[..]));
            stats.dumped += 1;
            source.release(frame);
        }
        Mode::Respond => match handle(frame, host) {
            Action::Reply(frame) => {
                stats.tx_retries += transmit_blocking(source, frame)?;
                stats.replied += 1;
            }
            Action::Discard(frame) => {
                stats.discarded += 1;
                source.release(frame);
            }
        },
    };

    Ok(())
}

/// Transmits a frame, spinning for as long as the transmit ring is full, and
/// returns the number of retries.
fn transmit_blocking<S: PacketSource>(source: &mut S, mut frame: FrameBuffer) -> Result<u64> {
    let mut retries = 0;

    loop {
        match source.transmit(frame)? {
            Transmit::Committed => return Ok(retries),
            Transmit::Busy(busy) => {
                frame = busy;
                retries += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dev::Buffered;
    use crate::core::repr::{
        eth_types,
        EthernetAddress,
        EthernetFrame,
    };
    use crate::core::source::PollingSource;
    use crate::core::storage::{
        Pool,
        FRAME_CAPACITY,
    };

    const DEV_ETH: EthernetAddress = EthernetAddress::new([0x06, 0x11, 0x22, 0x33, 0x44, 0x55]);

    const HOST_IPV4: Ipv4Address = Ipv4Address::new([172, 44, 0, 2]);

    // who-has 172.44.0.2 tell 10.0.0.5
    const REQUEST: [u8; 42] = [
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x08, 0x06, 0x00,
        0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x0A, 0x00,
        0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xAC, 0x2C, 0x00, 0x02,
    ];

    fn service(mode: Mode) -> Service<PollingSource<Buffered, Pool>> {
        let dev = Buffered::new(DEV_ETH, 8);
        let source = PollingSource::new(dev, Pool::new(8, 0, FRAME_CAPACITY), 4);
        Service::new(source, HOST_IPV4, mode)
    }

    #[test]
    fn test_host_from_source() {
        let service = service(Mode::Respond);
        assert_eq!(service.host(), &Host::new(DEV_ETH, HOST_IPV4));
        assert_eq!(service.mode(), Mode::Respond);
    }

    #[test]
    fn test_poll_when_empty() {
        let mut service = service(Mode::Respond);
        assert_matches!(service.poll(), Ok(0));
        assert_eq!(service.stats(), &Stats::default());
    }

    #[test]
    fn test_poll_replies_and_discards() {
        let mut service = service(Mode::Respond);
        let mut ipv4_frame = REQUEST;
        EthernetFrame::try_new(&mut ipv4_frame[..])
            .unwrap()
            .set_payload_type(eth_types::IPV4);

        service.source_mut().dev_mut().push_rx(&REQUEST).unwrap();
        service.source_mut().dev_mut().push_rx(&ipv4_frame).unwrap();

        assert_matches!(service.poll(), Ok(2));
        assert_eq!(
            service.stats(),
            &Stats {
                received: 2,
                replied: 1,
                discarded: 1,
                dumped: 0,
                tx_retries: 0,
            }
        );

        let reply = service.source_mut().dev_mut().pop_tx().unwrap();
        let eth_frame = EthernetFrame::try_new(&reply[..]).unwrap();
        assert_eq!(eth_frame.src_addr(), DEV_ETH);
        assert_eq!(service.source_mut().dev_mut().pop_tx(), None);
        assert_eq!(
            service.source().posted() + service.source().allocator().available(),
            8
        );
    }

    #[test]
    fn test_busy_transmits_are_retried() {
        let mut service = service(Mode::Respond);
        service.source_mut().dev_mut().set_busy_sends(3);
        service.source_mut().dev_mut().push_rx(&REQUEST).unwrap();

        assert_matches!(service.poll(), Ok(1));
        assert_eq!(service.stats().tx_retries, 3);
        assert_eq!(service.stats().replied, 1);
        assert_eq!(service.source_mut().dev_mut().tx_len(), 1);
    }

    #[test]
    fn test_dump_never_transmits() {
        let mut service = service(Mode::Dump);
        service.source_mut().dev_mut().push_rx(&REQUEST).unwrap();

        assert_matches!(service.poll(), Ok(1));
        assert_eq!(service.stats().dumped, 1);
        assert_eq!(service.stats().replied, 0);
        assert_eq!(service.source_mut().dev_mut().tx_len(), 0);
    }

    #[test]
    fn test_poll_surfaces_device_faults() {
        let mut service = service(Mode::Respond);
        service.source_mut().dev_mut().set_faulted(true);
        assert_matches!(service.poll(), Err(crate::Error::Device(_)));
    }
}
