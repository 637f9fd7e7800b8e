//! # Hash Functions
//!
//! Tree profiles take their hash function as a type parameter so the
//! tree algorithms stay independent of the digest primitive. SHA-256 is
//! the only function registered for both profiles today.

use scitt_core::Digest;
use sha2::{Digest as _, Sha256};

/// A 32-byte-output hash function.
pub trait HashFunction: Send + Sync {
    /// Hash a single byte string.
    fn hash(&self, data: &[u8]) -> Digest;

    /// Hash the concatenation of `parts` without materializing it.
    fn hash_parts(&self, parts: &[&[u8]]) -> Digest {
        let buf: Vec<u8> = parts.concat();
        self.hash(&buf)
    }
}

/// SHA-256 (FIPS 180-4).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256Hash;

impl HashFunction for Sha256Hash {
    fn hash(&self, data: &[u8]) -> Digest {
        Digest::new(Sha256::digest(data).into())
    }

    fn hash_parts(&self, parts: &[&[u8]]) -> Digest {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        Digest::new(hasher.finalize().into())
    }
}

/// SHA-256 of raw bytes.
pub fn sha256(data: &[u8]) -> Digest {
    Sha256Hash.hash(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_empty_known_vector() {
        assert_eq!(
            sha256(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_abc_known_vector() {
        assert_eq!(
            sha256(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_parts_equals_concatenation() {
        let h = Sha256Hash;
        assert_eq!(h.hash_parts(&[b"a", b"", b"bc"]), h.hash(b"abc"));
    }
}
