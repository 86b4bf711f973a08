extern crate env_logger;
extern crate usrarp;

use usrarp::core::dev::Buffered;
use usrarp::core::dump::HexDump;
use usrarp::core::repr::{
    eth_types,
    Arp,
    ArpOp,
    EthernetAddress,
    EthernetFrame,
    Ipv4Address,
};
use usrarp::core::service::{
    Mode,
    Service,
};
use usrarp::core::source::PollingSource;
use usrarp::core::storage::{
    Pool,
    FRAME_CAPACITY,
};

const HOST_ETH_ADDR: EthernetAddress = EthernetAddress::new([0x06, 0x11, 0x22, 0x33, 0x44, 0x55]);

const HOST_IPV4_ADDR: Ipv4Address = Ipv4Address::new([172, 44, 0, 2]);

const PEER_ETH_ADDR: EthernetAddress = EthernetAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);

const PEER_IPV4_ADDR: Ipv4Address = Ipv4Address::new([172, 44, 0, 1]);

/// Feeds a who-has request through an in memory device and prints the reply.
/// Run with RUST_LOG=debug to watch the responder at work.
fn main() {
    env_logger::init();

    let arp = Arp::EthernetIpv4 {
        op: ArpOp::Request,
        source_hw_addr: PEER_ETH_ADDR,
        source_proto_addr: PEER_IPV4_ADDR,
        target_hw_addr: EthernetAddress::NULL,
        target_proto_addr: HOST_IPV4_ADDR,
    };

    let mut request = vec![0; EthernetFrame::<&[u8]>::buffer_len(arp.buffer_len())];
    {
        let mut eth_frame = EthernetFrame::try_new(&mut request[..]).unwrap();
        eth_frame.set_dst_addr(EthernetAddress::BROADCAST);
        eth_frame.set_src_addr(PEER_ETH_ADDR);
        eth_frame.set_payload_type(eth_types::ARP);
        arp.serialize(eth_frame.payload_mut()).unwrap();
    }

    let dev = Buffered::new(HOST_ETH_ADDR, 4);
    let source = PollingSource::new(dev, Pool::new(4, 0, FRAME_CAPACITY), 2);
    let mut service = Service::new(source, HOST_IPV4_ADDR, Mode::Respond);

    service.source_mut().dev_mut().push_rx(&request).unwrap();
    service.poll().unwrap();

    println!("Request:\n{}\n", HexDump(&request));

    match service.source_mut().dev_mut().pop_tx() {
        Some(reply) => {
            println!("Reply:\n{}\n", HexDump(&reply));
            let eth_frame = EthernetFrame::try_new(&reply[..]).unwrap();
            if let Ok(Arp::EthernetIpv4 {
                source_hw_addr,
                source_proto_addr,
                ..
            }) = Arp::deserialize(eth_frame.payload())
            {
                println!("{} is at {}", source_proto_addr, source_hw_addr);
            }
        }
        None => println!("No reply!"),
    }

    println!("{:?}", service.stats());
}
