/// [IPv4 address](https://en.wikipedia.org/wiki/IPv4) in network byte order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address([u8; 4]);

impl Address {
    /// Creates an IPv4 address from a network byte order buffer.
    pub const fn new(addr: [u8; 4]) -> Address {
        Address(addr)
    }

    /// Returns a reference to the network byte order representation of the address.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

impl std::str::FromStr for Address {
    type Err = ();

    /// Parses an Ipv4 address from an A.B.C.D style string.
    fn from_str(addr: &str) -> std::result::Result<Address, Self::Err> {
        let bytes = addr
            .split('.')
            .map(|token| token.parse::<u8>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| ())?;

        if bytes.len() != 4 {
            return Err(());
        }

        let mut ipv4: [u8; 4] = [0; 4];
        ipv4.copy_from_slice(&bytes);

        Ok(Address::new(ipv4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let addr: Address = "172.44.0.2".parse().unwrap();
        assert_eq!(addr, Address::new([172, 44, 0, 2]));
        assert_eq!(addr.to_string(), "172.44.0.2");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_matches!("172.44.0".parse::<Address>(), Err(()));
        assert_matches!("172.44.0.256".parse::<Address>(), Err(()));
        assert_matches!("a.b.c.d".parse::<Address>(), Err(()));
    }
}
