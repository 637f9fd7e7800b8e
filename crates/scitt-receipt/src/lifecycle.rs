//! # Receipt Typestate
//!
//! A receipt moves through three states, each a distinct type:
//!
//! - `Signed` → the signer's output. The tree root is attached as the
//!   payload and the proofs are being written into the unprotected header.
//! - `Detached` → the payload slot is nil. This is the only state that is
//!   serialized, stored, or handed to a relying party.
//! - `Attached` → a verifier's reconstruction. A recomputed root has been
//!   placed in the payload slot and the signature can be checked.
//!
//! ```text
//! Signed ──detach()──▶ Detached ──attach(root)──▶ Attached ──verify()──▶ Verdict
//!                         ▲
//!              from_bytes()
//! ```
//!
//! ## Security Invariant
//!
//! `Receipt::<Detached>::from_bytes()` refuses an envelope whose payload is
//! not nil. A receipt that arrives with a payload already filled in can
//! never reach signature verification, since `attach()` and `verify()` are
//! only reachable through that constructor.

use std::marker::PhantomData;

use scitt_core::{CoseError, Digest, ReceiptError, VerifiableDataStructure};
use scitt_cose::{CoseSign1, HeaderExtension, ProtectedHeader, Signer, Verifier};

// ─── State Types ─────────────────────────────────────────────────────

/// Receipt state: payload attached, freshly signed.
#[derive(Debug, Clone, Copy)]
pub struct Signed;

/// Receipt state: payload detached, ready to hand out.
#[derive(Debug, Clone, Copy)]
pub struct Detached;

/// Receipt state: recomputed root reattached, ready to verify.
#[derive(Debug, Clone, Copy)]
pub struct Attached;

mod private {
    pub trait Sealed {}
    impl Sealed for super::Signed {}
    impl Sealed for super::Detached {}
    impl Sealed for super::Attached {}
}

/// Marker trait for receipt states. Sealed.
pub trait ReceiptState: private::Sealed + std::fmt::Debug {
    fn name() -> &'static str;
}

impl ReceiptState for Signed {
    fn name() -> &'static str {
        "SIGNED"
    }
}
impl ReceiptState for Detached {
    fn name() -> &'static str {
        "DETACHED"
    }
}
impl ReceiptState for Attached {
    fn name() -> &'static str {
        "ATTACHED"
    }
}

/// Outcome of checking a reattached receipt's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Verified,
    /// The verifier reported `SignatureInvalid`; the reason is kept for
    /// logging.
    Rejected(String),
}

impl Verdict {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }
}

// ─── Receipt ─────────────────────────────────────────────────────────

/// A COSE_Sign1 receipt in state `S`.
#[derive(Debug, Clone)]
pub struct Receipt<S: ReceiptState> {
    envelope: CoseSign1,
    _state: PhantomData<S>,
}

impl<S: ReceiptState> Receipt<S> {
    fn wrap(envelope: CoseSign1) -> Self {
        Self {
            envelope,
            _state: PhantomData,
        }
    }

    pub fn state_name(&self) -> &'static str {
        S::name()
    }

    pub fn envelope(&self) -> &CoseSign1 {
        &self.envelope
    }

    pub fn header_extension(&self) -> &HeaderExtension {
        &self.envelope.unprotected
    }

    pub fn protected_header(&self) -> Result<ProtectedHeader, ReceiptError> {
        Ok(self.envelope.protected_header()?)
    }

    /// Fail unless the protected header names `expected` or names no
    /// structure at all.
    pub fn require_structure(&self, expected: VerifiableDataStructure) -> Result<(), ReceiptError> {
        match self.protected_header()?.verifiable_data_structure {
            Some(actual) if actual != expected.as_i64() => {
                Err(ReceiptError::UnsupportedStructure { expected, actual })
            }
            _ => Ok(()),
        }
    }
}

impl Receipt<Signed> {
    /// Sign `root` under `protected`.
    pub fn sign(
        signer: &dyn Signer,
        protected: &ProtectedHeader,
        root: &Digest,
    ) -> Result<Self, ReceiptError> {
        let bytes = signer.sign(protected, root.as_bytes())?;
        let envelope = CoseSign1::from_bytes(&bytes)?;
        if envelope.payload.as_deref() != Some(root.as_bytes().as_slice()) {
            return Err(CoseError::NotSign1(
                "signer did not return the root as an attached payload".into(),
            )
            .into());
        }
        Ok(Self::wrap(envelope))
    }

    /// Replace the unprotected header with `ext`.
    pub fn with_header_extension(self, ext: HeaderExtension) -> Self {
        Self::wrap(self.envelope.with_header_extension(ext))
    }

    /// Null the payload slot.
    pub fn detach(self) -> Result<Receipt<Detached>, ReceiptError> {
        let (_, envelope) = self.envelope.detach()?;
        Ok(Receipt::wrap(envelope))
    }
}

impl Receipt<Detached> {
    /// Decode a receipt. The payload slot must be nil.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReceiptError> {
        let envelope = CoseSign1::from_bytes(bytes)?;
        if !envelope.is_detached() {
            return Err(CoseError::PayloadNotDetached.into());
        }
        Ok(Self::wrap(envelope))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ReceiptError> {
        Ok(self.envelope.to_bytes()?)
    }

    /// Replace the unprotected header with `ext`.
    pub fn with_header_extension(self, ext: HeaderExtension) -> Self {
        Self::wrap(self.envelope.with_header_extension(ext))
    }

    /// Place a recomputed root into the payload slot.
    pub fn attach(&self, root: &Digest) -> Result<Receipt<Attached>, ReceiptError> {
        let envelope = self.envelope.clone().attach(root.as_bytes())?;
        Ok(Receipt::wrap(envelope))
    }
}

impl Receipt<Attached> {
    /// Run the verifier once. `SignatureInvalid` becomes
    /// `Verdict::Rejected`; every other verifier error propagates.
    pub fn verify(&self, verifier: &dyn Verifier) -> Result<Verdict, ReceiptError> {
        let bytes = self.envelope.to_bytes()?;
        match verifier.verify(&bytes) {
            Ok(()) => Ok(Verdict::Verified),
            Err(CoseError::SignatureInvalid(reason)) => Ok(Verdict::Rejected(reason)),
            Err(e) => Err(e.into()),
        }
    }
}
