use std::fmt::{
    Display,
    Formatter,
    Result as FmtResult,
};

use crate::core::repr::{
    eth_types,
    ArpOp,
    ArpPacket,
    EthernetAddress,
    EthernetFrame,
    Ipv4Address,
};

/// Smallest frame that can carry an Ethernet/IPv4 ARP packet.
pub const MIN_FRAME_LEN: usize = 14 + 28;

/// The addresses a responder answers ARP requests for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Host {
    /// Ethernet address of the device the responder runs on.
    pub ethernet_addr: EthernetAddress,
    /// IPv4 address the responder claims.
    pub ipv4_addr: Ipv4Address,
}

impl Host {
    pub fn new(ethernet_addr: EthernetAddress, ipv4_addr: Ipv4Address) -> Host {
        Host {
            ethernet_addr,
            ipv4_addr,
        }
    }
}

/// What to do with a frame after it has been handled.
#[derive(Debug)]
pub enum Action<T> {
    /// The frame was rewritten into an ARP reply and should be transmitted.
    Reply(T),
    /// The frame is of no interest and should be released untouched.
    Discard(T),
}

/// Reason a frame was not answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ignored {
    /// The frame is too short to hold an ARP packet.
    Truncated(usize),
    /// The frame does not carry ARP.
    EthernetType(u16),
    /// The frame is neither broadcast nor addressed to the host.
    Destination(EthernetAddress),
    /// The ARP packet does not map IPv4 addresses to Ethernet addresses.
    Format,
    /// The ARP packet is not a request.
    Op(u16),
    /// The ARP request targets another hardware address.
    TargetHwAddr(EthernetAddress),
    /// The ARP request asks for another IPv4 address.
    TargetProtoAddr(Ipv4Address),
}

impl Display for Ignored {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match *self {
            Ignored::Truncated(len) => write!(f, "frame of {} bytes is too short", len),
            Ignored::EthernetType(eth_type) => write!(f, "ethernet type 0x{:04x}", eth_type),
            Ignored::Destination(addr) => write!(f, "destination {}", addr),
            Ignored::Format => write!(f, "ARP packet is not Ethernet/IPv4"),
            Ignored::Op(op) => write!(f, "ARP op {}", op),
            Ignored::TargetHwAddr(addr) => write!(f, "ARP target hardware address {}", addr),
            Ignored::TargetProtoAddr(addr) => write!(f, "ARP target IPv4 address {}", addr),
        }
    }
}

/// Checks if a frame is an ARP request the host should answer.
///
/// Nothing is written to the frame. The checks run in wire order and stop at
/// the first mismatch.
pub fn inspect(buffer: &[u8], host: &Host) -> std::result::Result<(), Ignored> {
    if buffer.len() < MIN_FRAME_LEN {
        return Err(Ignored::Truncated(buffer.len()));
    }

    let eth_frame =
        EthernetFrame::try_new(buffer).map_err(|_| Ignored::Truncated(buffer.len()))?;

    if eth_frame.payload_type() != eth_types::ARP {
        return Err(Ignored::EthernetType(eth_frame.payload_type()));
    }

    let dst_addr = eth_frame.dst_addr();
    if !dst_addr.is_broadcast() && dst_addr != host.ethernet_addr {
        return Err(Ignored::Destination(dst_addr));
    }

    let arp_packet =
        ArpPacket::try_new(eth_frame.payload()).map_err(|_| Ignored::Truncated(buffer.len()))?;

    if !arp_packet.is_ethernet_ipv4() {
        return Err(Ignored::Format);
    }

    if arp_packet.op() != ArpOp::Request as u16 {
        return Err(Ignored::Op(arp_packet.op()));
    }

    // Requests may leave the target hardware address unset, broadcast it, or
    // name us directly.
    let target_hw_addr = arp_packet.target_hw_addr();
    if !target_hw_addr.is_null()
        && !target_hw_addr.is_broadcast()
        && target_hw_addr != host.ethernet_addr
    {
        return Err(Ignored::TargetHwAddr(target_hw_addr));
    }

    if arp_packet.target_proto_addr() != host.ipv4_addr {
        return Err(Ignored::TargetProtoAddr(arp_packet.target_proto_addr()));
    }

    Ok(())
}

/// Handles a received frame, turning ARP requests for the host into replies
/// in place.
///
/// The buffer is always handed back, either as a reply ready to transmit or
/// untouched for discarding.
pub fn handle<T>(mut buffer: T, host: &Host) -> Action<T>
where
    T: AsRef<[u8]> + AsMut<[u8]>,
{
    if let Err(ignored) = inspect(buffer.as_ref(), host) {
        debug!("Ignoring frame, {}.", ignored);
        return Action::Discard(buffer);
    }

    let (hw_addr, proto_addr) = reflect(buffer.as_mut(), host);
    info!("Sending ARP reply to {}/{}.", proto_addr, hw_addr);
    Action::Reply(buffer)
}

/// Rewrites an ARP request into the matching reply and returns the
/// requester's addresses.
///
/// The buffer must have passed inspect(...), which guarantees it holds a full
/// Ethernet header followed by a full ARP packet.
fn reflect(buffer: &mut [u8], host: &Host) -> (EthernetAddress, Ipv4Address) {
    let mut eth_frame = EthernetFrame::new_unchecked(buffer);
    eth_frame.set_dst_addr(eth_frame.src_addr());
    eth_frame.set_src_addr(host.ethernet_addr);

    // The new destination is the requester.
    let requester_hw_addr = eth_frame.dst_addr();

    let mut arp_packet = ArpPacket::new_unchecked(eth_frame.payload_mut());
    let requester_proto_addr = arp_packet.source_proto_addr();

    arp_packet.set_op(ArpOp::Reply);
    arp_packet.set_target_hw_addr(requester_hw_addr);
    arp_packet.set_source_hw_addr(host.ethernet_addr);
    arp_packet.set_target_proto_addr(requester_proto_addr);
    arp_packet.set_source_proto_addr(host.ipv4_addr);

    (requester_hw_addr, requester_proto_addr)
}
