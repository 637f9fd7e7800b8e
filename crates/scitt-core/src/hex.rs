//! Lowercase hex encoding for digests, keys, and CLI I/O.

use std::fmt;

/// Error returned when a string is not valid hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexError(String);

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for HexError {}

impl From<String> for HexError {
    fn from(msg: String) -> Self {
        Self(msg)
    }
}

/// Encode bytes as lowercase hex.
pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string (either case, surrounding whitespace ignored).
pub fn decode(hex: &str) -> Result<Vec<u8>, HexError> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return Err(HexError(format!("hex string has odd length: {}", hex.len())));
    }
    hex.as_bytes()
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            let s = std::str::from_utf8(pair)
                .map_err(|_| HexError(format!("invalid hex at position {}", i * 2)))?;
            u8::from_str_radix(s, 16)
                .map_err(|_| HexError(format!("invalid hex at position {}", i * 2)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_lowercase() {
        assert_eq!(encode(&[0xde, 0xad, 0xBE, 0xef]), "deadbeef");
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_decode_accepts_mixed_case_and_whitespace() {
        assert_eq!(decode("  DeadBEEF\n").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_decode_odd_length_rejected() {
        assert!(decode("abc").is_err());
    }

    #[test]
    fn test_decode_non_hex_rejected() {
        let err = decode("zz00").unwrap_err();
        assert!(err.to_string().contains("position 0"));
    }
}
