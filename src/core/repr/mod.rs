//! Serialization and deserialization of network packets.
//!
//! The `repr` module provides views over byte buffers for reading and writing
//! Ethernet and ARP headers in place, plus an owned ARP representation.

pub mod arp;
pub mod ethernet;
pub mod ipv4;

pub use self::arp::{
    hw_types as arp_hw_types,
    proto_types as arp_proto_types,
    Arp,
    Op as ArpOp,
    Packet as ArpPacket,
};
pub use self::ethernet::{
    eth_types,
    Address as EthernetAddress,
    Frame as EthernetFrame,
};
pub use self::ipv4::Address as Ipv4Address;
