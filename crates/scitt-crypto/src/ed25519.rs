//! # Ed25519 Signing and Verification
//!
//! Provides Ed25519 key generation, signing, and verification for the
//! COSE `EdDSA` algorithm. The COSE layer builds the `Sig_structure`; this
//! module signs and verifies whatever bytes it is handed.
//!
//! ## Security Invariant
//!
//! - Private keys are never serialized or logged. `SigningKey` does not
//!   implement `Serialize`, and its `Debug` output is redacted.
//! - Seeds are only exposed through [`SigningKey::seed_hex()`], which the
//!   key-generation command writes to disk.
//!
//! ## Serde
//!
//! - Public keys serialize/deserialize as hex-encoded strings.
//! - Signatures serialize/deserialize as hex-encoded strings.

use ed25519_dalek::{Signer as _, Verifier as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use scitt_core::error::CryptoError;
use scitt_core::hex;

/// An Ed25519 public key (32 bytes) for signature verification.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An Ed25519 signing key.
pub struct SigningKey {
    inner: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey impls
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the public key as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse a public key from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::KeyError(e.to_string()))?;
        let arr: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::KeyError(format!(
                "public key must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Default key identifier: the first eight bytes of the key.
    pub fn default_kid(&self) -> Vec<u8> {
        self.0[..8].to_vec()
    }

    /// Verify `signature` over `message`.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CryptoError> {
        let vk = ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))?;
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        vk.verify(message, &sig).map_err(|e| {
            CryptoError::VerificationFailed(format!("Ed25519 verification failed: {e}"))
        })
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", hex::encode(&self.0[..4]))
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature impls
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Copy a signature out of a slice; it must be exactly 64 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; 64] = bytes.try_into().map_err(|_| {
            CryptoError::VerificationFailed(format!(
                "signature must be 64 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        Self::from_slice(&bytes).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex::encode(&self.0[..4]))
    }
}

// ---------------------------------------------------------------------------
// SigningKey impls
// ---------------------------------------------------------------------------

impl SigningKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            inner: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Create a key from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            inner: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Parse a key from a 64-character hex seed.
    pub fn from_seed_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s).map_err(|e| CryptoError::KeyError(e.to_string()))?;
        let seed: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::KeyError(format!(
                "private key must be 32 bytes (64 hex chars), got {} bytes",
                bytes.len()
            ))
        })?;
        Ok(Self::from_seed(&seed))
    }

    /// The seed as hex, for writing key files.
    pub fn seed_hex(&self) -> String {
        hex::encode(&self.inner.to_bytes())
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.inner.verifying_key().to_bytes())
    }

    /// Sign raw bytes.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.inner.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey(<private>)")
    }
}
