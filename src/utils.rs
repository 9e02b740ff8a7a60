//! A collection of utilities for handling bit strings and probabilities.

use crate::error::{CtwError, Result};

/// Conversion between the textual and the in-memory form of bit sequences.
/// In memory a sequence is a slice of u8 values, each holding 0 or 1, with
/// the most recent symbol last.
pub mod bits {
    use super::{CtwError, Result};

    /// Parse a string of '0' and '1' characters. ASCII whitespace is skipped,
    /// so bit files can be wrapped over several lines.
    pub fn parse_bits(text: &str) -> Result<Vec<u8>> {
        let mut bits = Vec::with_capacity(text.len());
        for (position, ch) in text.chars().enumerate() {
            match ch {
                '0' => bits.push(0),
                '1' => bits.push(1),
                c if c.is_ascii_whitespace() => {}
                ch => return Err(CtwError::InvalidCharacter { ch, position }),
            }
        }
        Ok(bits)
    }

    /// Render the bits 'bits' as a string of '0' and '1'.
    pub fn format_bits(bits: &[u8]) -> String {
        bits.iter()
            .map(|b| if *b == 0 { '0' } else { '1' })
            .collect()
    }

    /// Expand each byte of 'bytes' into eight bits, MSB first.
    pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
        let mut bits = Vec::with_capacity(bytes.len() * 8);
        for byte in bytes {
            for i in (0..8).rev() {
                bits.push((byte >> i) & 1);
            }
        }
        bits
    }

    #[test]
    fn test_parse_and_format() {
        assert_eq!(parse_bits("0110").unwrap(), vec![0, 1, 1, 0]);
        assert_eq!(parse_bits("01\n1 0").unwrap(), vec![0, 1, 1, 0]);
        assert_eq!(parse_bits("").unwrap(), Vec::<u8>::new());
        assert_eq!(format_bits(&[1, 0, 0, 1]), "1001");
        assert_eq!(
            parse_bits("01x"),
            Err(CtwError::InvalidCharacter {
                ch: 'x',
                position: 2
            })
        );
    }

    #[test]
    fn test_bytes_to_bits() {
        assert_eq!(bytes_to_bits(&[0x81]), vec![1, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(bytes_to_bits(&[0x0f, 0x00]).len(), 16);
    }
}

/// Helpers for working with probabilities, linear and in the log2 domain.
pub mod probability {
    /// Return log2((2^a + 2^b) / 2) without leaving the log domain.
    pub fn log2_average(a: f64, b: f64) -> f64 {
        let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
        if lo == f64::NEG_INFINITY {
            return hi - 1.0;
        }
        hi + (1.0 + (lo - hi).exp2()).log2() - 1.0
    }

    /// Scale the probability 'p' into the 16-bit range used by the models.
    /// The result is clamped to 1..=65535 so that a coder never sees a
    /// certain event.
    pub fn to_u16(p: f64) -> u16 {
        let scaled = (p * 65536.0).round();
        scaled.clamp(1.0, 65535.0) as u16
    }

    /// Return true if 'p' can be used as a divisor without losing precision.
    pub fn is_representable(p: f64) -> bool {
        p.is_normal() && p > 0.0
    }

    #[test]
    fn test_log2_average() {
        assert_eq!(log2_average(0.0, 0.0), 0.0);
        assert_eq!(log2_average(-1.0, f64::NEG_INFINITY), -2.0);
        // log2((1/2 + 1/8) / 2) = log2(5/16).
        let expected = (5.0_f64 / 16.0).log2();
        assert!((log2_average(-1.0, -3.0) - expected).abs() < 1e-12);
        assert!((log2_average(-3.0, -1.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_to_u16() {
        assert_eq!(to_u16(0.5), 32768);
        assert_eq!(to_u16(0.0), 1);
        assert_eq!(to_u16(1.0), 65535);
    }
}

/// Return the symbol if it is a bit, or an error.
pub(crate) fn check_symbol(symbol: u8) -> Result<u8> {
    match symbol {
        0 | 1 => Ok(symbol),
        _ => Err(CtwError::InvalidSymbol(symbol)),
    }
}
