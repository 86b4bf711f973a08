use usrarp::core::dev::Buffered;
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
use usrarp::core::source::{
    InterruptSource,
    PollingSource,
};
use usrarp::core::storage::{
    Pool,
    FRAME_CAPACITY,
};

lazy_static! {
    pub static ref HOST_ETH_ADDR: EthernetAddress =
        EthernetAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);

    pub static ref HOST_IPV4_ADDR: Ipv4Address = Ipv4Address::new([172, 44, 0, 2]);

    pub static ref PEER_ETH_ADDR: EthernetAddress =
        EthernetAddress::new([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);

    pub static ref PEER_IPV4_ADDR: Ipv4Address = Ipv4Address::new([10, 0, 0, 5]);
}

pub const RX_RING_LEN: usize = 4;

pub const POOL_SIZE: usize = 8;

/// Returns a device that can queue up to 32 received frames.
pub fn device() -> Buffered {
    Buffered::new(*HOST_ETH_ADDR, 32)
}

#[allow(dead_code)]
pub fn polling_service(mode: Mode) -> Service<PollingSource<Buffered, Pool>> {
    let pool = Pool::new(POOL_SIZE, 0, FRAME_CAPACITY);
    Service::new(
        PollingSource::new(device(), pool, RX_RING_LEN),
        *HOST_IPV4_ADDR,
        mode,
    )
}

#[allow(dead_code)]
pub fn interrupt_service(mode: Mode) -> Service<InterruptSource<Buffered, Pool>> {
    let pool = Pool::new(POOL_SIZE, 0, FRAME_CAPACITY);
    Service::new(
        InterruptSource::new(device(), pool, RX_RING_LEN),
        *HOST_IPV4_ADDR,
        mode,
    )
}

/// Builds an Ethernet frame carrying an ARP packet from the peer.
pub fn arp_frame(dst_addr: EthernetAddress, arp: &Arp) -> Vec<u8> {
    let mut buffer = vec![0; EthernetFrame::<&[u8]>::buffer_len(arp.buffer_len())];
    {
        let mut eth_frame = EthernetFrame::try_new(&mut buffer[..]).unwrap();
        eth_frame.set_dst_addr(dst_addr);
        eth_frame.set_src_addr(*PEER_ETH_ADDR);
        eth_frame.set_payload_type(eth_types::ARP);
        arp.serialize(eth_frame.payload_mut()).unwrap();
    }
    buffer
}

/// Builds a broadcast who-has request from the peer.
pub fn who_has(target_proto_addr: Ipv4Address) -> Vec<u8> {
    let arp = Arp::EthernetIpv4 {
        op: ArpOp::Request,
        source_hw_addr: *PEER_ETH_ADDR,
        source_proto_addr: *PEER_IPV4_ADDR,
        target_hw_addr: EthernetAddress::NULL,
        target_proto_addr,
    };

    arp_frame(EthernetAddress::BROADCAST, &arp)
}

/// Checks that a frame is the reply to who_has(HOST_IPV4_ADDR).
pub fn assert_is_reply(buffer: &[u8]) {
    let eth_frame = EthernetFrame::try_new(buffer).unwrap();
    assert_eq!(eth_frame.dst_addr(), *PEER_ETH_ADDR);
    assert_eq!(eth_frame.src_addr(), *HOST_ETH_ADDR);
    assert_eq!(eth_frame.payload_type(), eth_types::ARP);
    assert_eq!(
        Arp::deserialize(eth_frame.payload()).unwrap(),
        Arp::EthernetIpv4 {
            op: ArpOp::Reply,
            source_hw_addr: *HOST_ETH_ADDR,
            source_proto_addr: *HOST_IPV4_ADDR,
            target_hw_addr: *PEER_ETH_ADDR,
            target_proto_addr: *PEER_IPV4_ADDR,
        }
    );
}
