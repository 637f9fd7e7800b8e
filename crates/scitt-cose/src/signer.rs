//! # Signer and Verifier Capabilities
//!
//! The receipt protocol never touches key material. It hands a protected
//! header and a payload to a [`Signer`] and gets back an attached
//! COSE_Sign1; it hands a reattached envelope to a [`Verifier`] and gets
//! back success or `SignatureInvalid`.
//!
//! Both traits are object-safe and `Send + Sync`, so callers can share one
//! instance across threads and pass it as `&dyn Signer` / `&dyn Verifier`.
//!
//! [`Ed25519Signer`] and [`Ed25519Verifier`] are the concrete `EdDSA`
//! implementations over the RFC 9052 `Sig_structure`.

use scitt_core::{Algorithm, CoseError};
use scitt_crypto::ed25519::{Ed25519PublicKey, Ed25519Signature, SigningKey};

use crate::header::HeaderExtension;
use crate::sign1::{sig_structure, CoseSign1, ProtectedHeader};

/// Produces attached COSE_Sign1 envelopes.
pub trait Signer: Send + Sync {
    /// The algorithm written into every protected header this signer emits.
    fn algorithm(&self) -> Algorithm;

    /// Sign `payload` under `protected`. The returned envelope carries the
    /// payload attached and an empty unprotected header.
    fn sign(&self, protected: &ProtectedHeader, payload: &[u8]) -> Result<Vec<u8>, CoseError>;
}

/// Checks the signature of an attached COSE_Sign1 envelope.
pub trait Verifier: Send + Sync {
    /// `Ok(())` when the signature is valid; `SignatureInvalid` when it is
    /// not; any other error when the envelope cannot be checked at all.
    fn verify(&self, envelope: &[u8]) -> Result<(), CoseError>;
}

// ---------------------------------------------------------------------------
// Ed25519
// ---------------------------------------------------------------------------

/// `EdDSA` signer backed by an Ed25519 key.
#[derive(Debug)]
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.key.public_key()
    }
}

impl Signer for Ed25519Signer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::EDDSA
    }

    fn sign(&self, protected: &ProtectedHeader, payload: &[u8]) -> Result<Vec<u8>, CoseError> {
        if let Some(alg) = protected.alg {
            if alg != Algorithm::EDDSA {
                return Err(CoseError::AlgorithmMismatch {
                    requested: alg.as_i64(),
                    signer: Algorithm::EDDSA.as_i64(),
                });
            }
        }
        let mut protected = protected.clone();
        protected.alg = Some(Algorithm::EDDSA);
        let protected = protected.to_bytes()?;

        let tbs = sig_structure(&protected, payload)?;
        let signature = self.key.sign(&tbs);

        CoseSign1 {
            protected,
            unprotected: HeaderExtension::new(),
            payload: Some(payload.to_vec()),
            signature: signature.as_bytes().to_vec(),
        }
        .to_bytes()
    }
}

/// `EdDSA` verifier for a single trusted public key.
#[derive(Debug, Clone)]
pub struct Ed25519Verifier {
    key: Ed25519PublicKey,
    kid: Option<Vec<u8>>,
}

impl Ed25519Verifier {
    pub fn new(key: Ed25519PublicKey) -> Self {
        Self { key, kid: None }
    }

    /// Only accept envelopes whose protected `kid` equals `kid`.
    ///
    /// A mismatch fails with [`CoseError::Key`] before the signature is
    /// checked: the envelope names a key this verifier does not hold, so the
    /// outcome is unprocessable rather than untrusted.
    pub fn with_kid(mut self, kid: impl Into<Vec<u8>>) -> Self {
        self.kid = Some(kid.into());
        self
    }
}

impl Verifier for Ed25519Verifier {
    fn verify(&self, envelope: &[u8]) -> Result<(), CoseError> {
        let env = CoseSign1::from_bytes(envelope)?;
        let protected = env.protected_header()?;

        match protected.alg {
            Some(Algorithm::EDDSA) => {}
            Some(other) => {
                return Err(CoseError::AlgorithmMismatch {
                    requested: other.as_i64(),
                    signer: Algorithm::EDDSA.as_i64(),
                })
            }
            None => return Err(CoseError::MalformedHeader("protected header has no alg".into())),
        }
        if let Some(expected) = &self.kid {
            if protected.kid.as_ref() != Some(expected) {
                return Err(CoseError::Key("kid does not match the trusted key".into()));
            }
        }

        let tbs = env.to_be_signed()?;
        let signature = Ed25519Signature::from_slice(&env.signature)?;
        self.key.verify(&tbs, &signature)?;
        Ok(())
    }
}
