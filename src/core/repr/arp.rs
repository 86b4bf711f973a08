use std::io::{
    Cursor,
    Write,
};

use byteorder::{
    ByteOrder,
    NetworkEndian,
    WriteBytesExt,
};

use crate::core::repr::{
    EthernetAddress,
    Ipv4Address,
};
use crate::{
    Error,
    Result,
};

#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
// https://www.iana.org/assignments/arp-parameters/arp-parameters.xhtml#arp-parameters-1
pub enum Op {
    Request = 0x0001,
    Reply = 0x0002,
}

/// https://www.iana.org/assignments/arp-parameters/arp-parameters.xhtml#arp-parameters-2
pub mod hw_types {
    pub const ETHERNET: u16 = 0x0001;
}

/// https://www.iana.org/assignments/arp-parameters/arp-parameters.xhtml#arp-parameters-3
pub mod proto_types {
    pub const IPV4: u16 = 0x0800;
}

mod fields {
    use std::ops::Range;

    pub const HW_TYPE: Range<usize> = 0 .. 2;

    pub const PROTO_TYPE: Range<usize> = 2 .. 4;

    pub const HW_ADDR_LEN: usize = 4;

    pub const PROTO_ADDR_LEN: usize = 5;

    pub const OP: Range<usize> = 6 .. 8;

    pub const SOURCE_HW_ADDR: Range<usize> = 8 .. 14;

    pub const SOURCE_PROTO_ADDR: Range<usize> = 14 .. 18;

    pub const TARGET_HW_ADDR: Range<usize> = 18 .. 24;

    pub const TARGET_PROTO_ADDR: Range<usize> = 24 .. 28;
}

/// View of a byte buffer as an Ethernet/IPv4 ARP packet.
///
/// Only the fixed 28 byte layout is understood. Callers should check the
/// hardware/protocol types and address lengths before trusting the address
/// accessors.
#[derive(Debug)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> Packet<T> {
    pub const BUFFER_LEN: usize = 28;

    /// Tries to create an ARP packet view over a byte buffer.
    pub fn try_new(buffer: T) -> Result<Packet<T>> {
        if buffer.as_ref().len() < Self::BUFFER_LEN {
            Err(Error::Exhausted)
        } else {
            Ok(Packet { buffer })
        }
    }

    /// Creates an ARP packet view without checking the buffer length.
    ///
    /// Accessors panic if the buffer is shorter than BUFFER_LEN.
    pub fn new_unchecked(buffer: T) -> Packet<T> {
        Packet { buffer }
    }

    pub fn hw_type(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[fields::HW_TYPE])
    }

    pub fn proto_type(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[fields::PROTO_TYPE])
    }

    pub fn hw_addr_len(&self) -> u8 {
        self.buffer.as_ref()[fields::HW_ADDR_LEN]
    }

    pub fn proto_addr_len(&self) -> u8 {
        self.buffer.as_ref()[fields::PROTO_ADDR_LEN]
    }

    /// Returns the raw opcode, which may be neither a request nor a reply.
    pub fn op(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[fields::OP])
    }

    /// Checks if the packet maps IPv4 addresses to Ethernet addresses.
    pub fn is_ethernet_ipv4(&self) -> bool {
        self.hw_type() == hw_types::ETHERNET
            && self.proto_type() == proto_types::IPV4
            && self.hw_addr_len() == 6
            && self.proto_addr_len() == 4
    }

    pub fn source_hw_addr(&self) -> EthernetAddress {
        let mut addr = [0; 6];
        addr.copy_from_slice(&self.buffer.as_ref()[fields::SOURCE_HW_ADDR]);
        EthernetAddress::new(addr)
    }

    pub fn source_proto_addr(&self) -> Ipv4Address {
        let mut addr = [0; 4];
        addr.copy_from_slice(&self.buffer.as_ref()[fields::SOURCE_PROTO_ADDR]);
        Ipv4Address::new(addr)
    }

    pub fn target_hw_addr(&self) -> EthernetAddress {
        let mut addr = [0; 6];
        addr.copy_from_slice(&self.buffer.as_ref()[fields::TARGET_HW_ADDR]);
        EthernetAddress::new(addr)
    }

    pub fn target_proto_addr(&self) -> Ipv4Address {
        let mut addr = [0; 4];
        addr.copy_from_slice(&self.buffer.as_ref()[fields::TARGET_PROTO_ADDR]);
        Ipv4Address::new(addr)
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    pub fn set_op(&mut self, op: Op) {
        NetworkEndian::write_u16(&mut self.buffer.as_mut()[fields::OP], op as u16);
    }

    pub fn set_source_hw_addr(&mut self, addr: EthernetAddress) {
        self.buffer.as_mut()[fields::SOURCE_HW_ADDR].copy_from_slice(addr.as_bytes());
    }

    pub fn set_source_proto_addr(&mut self, addr: Ipv4Address) {
        self.buffer.as_mut()[fields::SOURCE_PROTO_ADDR].copy_from_slice(addr.as_bytes());
    }

    pub fn set_target_hw_addr(&mut self, addr: EthernetAddress) {
        self.buffer.as_mut()[fields::TARGET_HW_ADDR].copy_from_slice(addr.as_bytes());
    }

    pub fn set_target_proto_addr(&mut self, addr: Ipv4Address) {
        self.buffer.as_mut()[fields::TARGET_PROTO_ADDR].copy_from_slice(addr.as_bytes());
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arp {
    EthernetIpv4 {
        op: Op,
        source_hw_addr: EthernetAddress,
        source_proto_addr: Ipv4Address,
        target_hw_addr: EthernetAddress,
        target_proto_addr: Ipv4Address,
    },
}

impl Arp {
    /// Returns the size of the ARP packet when serialized to a buffer.
    pub fn buffer_len(&self) -> usize {
        8 + match *self {
            Arp::EthernetIpv4 { .. } => 20,
        }
    }

    /// Attempts to deserialize a buffer into an ARP packet.
    pub fn deserialize(buffer: &[u8]) -> Result<Arp> {
        let packet = Packet::try_new(buffer)?;

        if !packet.is_ethernet_ipv4() {
            return Err(Error::Malformed);
        }

        let op = match packet.op() {
            1 => Op::Request,
            2 => Op::Reply,
            _ => return Err(Error::Malformed),
        };

        Ok(Arp::EthernetIpv4 {
            op,
            source_hw_addr: packet.source_hw_addr(),
            source_proto_addr: packet.source_proto_addr(),
            target_hw_addr: packet.target_hw_addr(),
            target_proto_addr: packet.target_proto_addr(),
        })
    }

    /// Serializes the ARP packet into a buffer.
    ///
    /// You should ensure buffer has at least buffer_len() bytes to avoid errors.
    pub fn serialize(&self, buffer: &mut [u8]) -> Result<()> {
        if self.buffer_len() > buffer.len() {
            return Err(Error::Exhausted);
        }

        match *self {
            Arp::EthernetIpv4 {
                op,
                ref source_hw_addr,
                ref source_proto_addr,
                ref target_hw_addr,
                ref target_proto_addr,
            } => {
                let write = |writer: &mut Cursor<&mut [u8]>| -> std::io::Result<()> {
                    writer.write_u16::<NetworkEndian>(hw_types::ETHERNET)?;
                    writer.write_u16::<NetworkEndian>(proto_types::IPV4)?;
                    writer.write_u8(6)?;
                    writer.write_u8(4)?;
                    writer.write_u16::<NetworkEndian>(op as u16)?;
                    writer.write_all(source_hw_addr.as_bytes())?;
                    writer.write_all(source_proto_addr.as_bytes())?;
                    writer.write_all(target_hw_addr.as_bytes())?;
                    writer.write_all(target_proto_addr.as_bytes())
                };

                write(&mut Cursor::new(buffer)).map_err(|_| Error::Exhausted)
            }
        }
    }
}
