use std::fmt::{
    Display,
    Formatter,
    Result as FmtResult,
};
use std::result::Result as StdResult;
use std::str::FromStr;

use byteorder::{
    ByteOrder,
    NetworkEndian,
};

use crate::{
    Error,
    Result,
};

/// [MAC address](https://en.wikipedia.org/wiki/MAC_address) in network byte order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address([u8; 6]);

impl Address {
    pub const BROADCAST: Address = Address([0xFF; 6]);

    pub const NULL: Address = Address([0x00; 6]);

    /// Creates a MAC address from a network byte order buffer.
    pub const fn new(addr: [u8; 6]) -> Address {
        Address(addr)
    }

    /// Returns a reference to the network byte order representation of the
    /// address.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    // Checks if this is a unicast address.
    pub fn is_unicast(&self) -> bool {
        !(self.is_multicast() || self.is_broadcast())
    }

    // Checks if this is a multicast address.
    pub fn is_multicast(&self) -> bool {
        (self.0[0] & 0b00000001) > 0
    }

    /// Checks if this is a broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Checks if this is the all zeros address, used by ARP requests that do
    /// not know the target hardware address yet.
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Checks if this is a locally assigned address or OUI assigned by IEEE.
    pub fn is_local(&self) -> bool {
        (self.0[0] & 0b00000010) > 0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5],
        )
    }
}

impl FromStr for Address {
    type Err = ();

    /// Parses a MAC address from an A:B:C:D:E:F style string.
    fn from_str(addr: &str) -> StdResult<Address, Self::Err> {
        let bytes = addr
            .split(':')
            .map(|token| u8::from_str_radix(token, 16))
            .collect::<StdResult<Vec<_>, _>>()
            .map_err(|_| ())?;

        if bytes.len() != 6 {
            return Err(());
        }

        let mut mac: [u8; 6] = [0; 6];
        mac.copy_from_slice(&bytes);

        Ok(Address::new(mac))
    }
}

/// [https://en.wikipedia.org/wiki/EtherType](https://en.wikipedia.org/wiki/EtherType)
pub mod eth_types {
    pub const IPV4: u16 = 0x800;

    pub const ARP: u16 = 0x806;
}

mod fields {
    use std::ops::{
        Range,
        RangeFrom,
    };

    pub const DST_ADDR: Range<usize> = 0 .. 6;

    pub const SRC_ADDR: Range<usize> = 6 .. 12;

    pub const PAYLOAD_TYPE: Range<usize> = 12 .. 14;

    pub const PAYLOAD: RangeFrom<usize> = 14 ..;
}

/// View of a byte buffer as an Ethernet frame.
#[derive(Debug)]
pub struct Frame<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> AsRef<[u8]> for Frame<T> {
    fn as_ref(&self) -> &[u8] {
        self.buffer.as_ref()
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> AsMut<[u8]> for Frame<T> {
    fn as_mut(&mut self) -> &mut [u8] {
        self.buffer.as_mut()
    }
}

impl<T: AsRef<[u8]>> Frame<T> {
    pub const HEADER_LEN: usize = 14;

    /// Tries to create an Ethernet frame view over a byte buffer.
    pub fn try_new(buffer: T) -> Result<Frame<T>> {
        if buffer.as_ref().len() < Self::HEADER_LEN {
            Err(Error::Exhausted)
        } else {
            Ok(Frame { buffer })
        }
    }

    /// Creates an Ethernet frame view without checking the buffer length.
    ///
    /// Accessors panic if the buffer is shorter than HEADER_LEN.
    pub fn new_unchecked(buffer: T) -> Frame<T> {
        Frame { buffer }
    }

    /// Returns the length of an Ethernet frame with the specified payload size.
    pub fn buffer_len(payload_len: usize) -> usize {
        Self::HEADER_LEN + payload_len
    }

    pub fn dst_addr(&self) -> Address {
        let mut addr = [0; 6];
        addr.copy_from_slice(&self.buffer.as_ref()[fields::DST_ADDR]);
        Address(addr)
    }

    pub fn src_addr(&self) -> Address {
        let mut addr = [0; 6];
        addr.copy_from_slice(&self.buffer.as_ref()[fields::SRC_ADDR]);
        Address(addr)
    }

    pub fn payload_type(&self) -> u16 {
        NetworkEndian::read_u16(&self.buffer.as_ref()[fields::PAYLOAD_TYPE])
    }

    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[fields::PAYLOAD]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Frame<T> {
    pub fn set_dst_addr(&mut self, addr: Address) {
        self.buffer.as_mut()[fields::DST_ADDR].copy_from_slice(addr.as_bytes());
    }

    pub fn set_src_addr(&mut self, addr: Address) {
        self.buffer.as_mut()[fields::SRC_ADDR].copy_from_slice(addr.as_bytes());
    }

    pub fn set_payload_type(&mut self, payload_type: u16) {
        NetworkEndian::write_u16(&mut self.buffer.as_mut()[fields::PAYLOAD_TYPE], payload_type);
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[fields::PAYLOAD]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unicast() {
        let addr = Address::new([0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(addr.is_unicast());
    }

    #[test]
    fn test_is_multicast() {
        let addr = Address::new([0x01, 0x00, 0x5E, 0x00, 0x00, 0x01]);
        assert!(addr.is_multicast());
        assert!(!addr.is_broadcast());
    }

    #[test]
    fn test_is_broadcast() {
        let addr = Address::new([0xFF; 6]);
        assert!(addr.is_broadcast());
        assert!(!addr.is_unicast());
    }

    #[test]
    fn test_is_null() {
        assert!(Address::NULL.is_null());
        assert!(!Address::BROADCAST.is_null());
    }

    #[test]
    fn test_is_local() {
        let addr = Address::new([0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(addr.is_local());
    }

    #[test]
    fn test_parse_and_display() {
        let addr: Address = "aa:bb:cc:0d:0e:0f".parse().unwrap();
        assert_eq!(addr, Address::new([0xAA, 0xBB, 0xCC, 0x0D, 0x0E, 0x0F]));
        assert_eq!(addr.to_string(), "AA:BB:CC:0D:0E:0F");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_matches!("aa:bb:cc".parse::<Address>(), Err(()));
        assert_matches!("aa:bb:cc:dd:ee:zz".parse::<Address>(), Err(()));
        assert_matches!("aa:bb:cc:dd:ee:ff:00".parse::<Address>(), Err(()));
    }

    #[test]
    fn test_frame_too_short() {
        assert_matches!(Frame::try_new(&[0u8; 13][..]), Err(Error::Exhausted));
    }

    #[test]
    fn test_frame_fields() {
        let mut buffer = vec![0; Frame::<&[u8]>::buffer_len(4)];
        {
            let mut frame = Frame::try_new(&mut buffer[..]).unwrap();
            frame.set_dst_addr(Address::BROADCAST);
            frame.set_src_addr(Address::new([1, 2, 3, 4, 5, 6]));
            frame.set_payload_type(eth_types::ARP);
            frame.payload_mut().copy_from_slice(&[9, 8, 7, 6]);
        }

        assert_eq!(&buffer[12 .. 14], &[0x08, 0x06]);

        let frame = Frame::try_new(&buffer[..]).unwrap();
        assert_eq!(frame.dst_addr(), Address::BROADCAST);
        assert_eq!(frame.src_addr(), Address::new([1, 2, 3, 4, 5, 6]));
        assert_eq!(frame.payload_type(), eth_types::ARP);
        assert_eq!(frame.payload(), &[9, 8, 7, 6]);
    }
}
