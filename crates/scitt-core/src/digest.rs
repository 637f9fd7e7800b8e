//! # Digest — Fixed-Length Hash Values
//!
//! Defines `Digest`, the 32-byte value used for leaf hashes, interior
//! nodes, audit-path siblings, and tree roots in every profile.
//!
//! ## Security Invariant
//!
//! A `Digest` always holds exactly [`DIGEST_LEN`] bytes. Decoders that read
//! hashes off the wire go through [`Digest::from_slice()`], so a truncated
//! or padded sibling hash is rejected at the codec boundary instead of
//! silently producing a different root.
//!
//! ## Serde
//!
//! Serializes as a 64-character lowercase hex string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hex::{self, HexError};

/// Length in bytes of every digest handled by this workspace (SHA-256).
pub const DIGEST_LEN: usize = 32;

/// A 32-byte hash value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Digest(pub [u8; DIGEST_LEN]);

impl Digest {
    /// Wrap raw bytes.
    pub const fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Copy a digest out of a slice. Returns `None` unless the slice is
    /// exactly [`DIGEST_LEN`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; DIGEST_LEN] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    /// Return the raw bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Copy the bytes into a `Vec`, as used for CBOR byte strings.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse a digest from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, HexError> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes).ok_or_else(|| {
            HexError::from(format!(
                "digest must be {DIGEST_LEN} bytes, got {}",
                bytes.len()
            ))
        })
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Digest {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
