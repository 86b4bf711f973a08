//! Hex dumps of raw frames.

use std::fmt::{
    Display,
    Formatter,
    Result as FmtResult,
};

/// Number of bytes printed per line.
pub const BYTES_PER_LINE: usize = 16;

/// Displays a byte buffer as offset prefixed lines of hex bytes, with an
/// extra gap after every eighth byte.
///
/// ```text
/// 0000: ff ff ff ff ff ff 11 22  33 44 55 66 08 06 00 01
/// 0010: 08 00 06 04 00 01
/// ```
pub struct HexDump<'a>(pub &'a [u8]);

impl<'a> Display for HexDump<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        for (i, line) in self.0.chunks(BYTES_PER_LINE).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }

            write!(f, "{:04x}:", i * BYTES_PER_LINE)?;
            for (j, byte) in line.iter().enumerate() {
                if j == BYTES_PER_LINE / 2 {
                    write!(f, " ")?;
                }
                write!(f, " {:02x}", byte)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(HexDump(&[]).to_string(), "");
    }

    #[test]
    fn test_partial_line() {
        assert_eq!(HexDump(&[0x00, 0x0A, 0xFF]).to_string(), "0000: 00 0a ff");
    }

    #[test]
    fn test_multiple_lines() {
        let buffer: Vec<u8> = (0 .. 18).collect();
        assert_eq!(
            HexDump(&buffer).to_string(),
            "0000: 00 01 02 03 04 05 06 07  08 09 0a 0b 0c 0d 0e 0f\n0010: 10 11"
        );
    }
}
