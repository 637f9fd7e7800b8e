//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Tree errors are raised before any hashing whenever the inputs alone
//!   show the request cannot be satisfied.
//! - Envelope errors distinguish "this is not a receipt we can read" from
//!   "the signature over it is bad".
//! - [`ReceiptError::class()`] splits every failure into the two outcomes
//!   a relying party acts on: untrusted or unprocessable.

use thiserror::Error;

use crate::label::{ProofKind, VerifiableDataStructure};

/// Error from a hash-tree profile.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// A ledger leaf failed field validation.
    #[error("invalid leaf: {0}")]
    InvalidLeaf(String),

    /// Requested leaf index is not inside the tree.
    #[error("leaf index {index} out of range for tree of size {tree_size}")]
    IndexOutOfRange {
        /// The requested index.
        index: u64,
        /// Number of leaves in the tree.
        tree_size: u64,
    },

    /// Requested consistency range is not a valid prefix relation.
    #[error("invalid consistency range: old size {old_size}, new size {new_size}")]
    InvalidRange {
        /// Size of the earlier tree.
        old_size: u64,
        /// Size of the later tree.
        new_size: u64,
    },

    /// A proof's shape does not match its claimed tree sizes.
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    /// A consistency proof does not reproduce the trusted old root.
    #[error("consistency proof does not reproduce the trusted old root")]
    RootMismatch,
}

/// Error in raw key handling or signature checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),
}

/// Error while reading, writing, signing, or verifying a COSE_Sign1.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoseError {
    /// Bytes are not well-formed CBOR.
    #[error("cbor decode error: {0}")]
    Decode(String),

    /// A value could not be serialized.
    #[error("cbor encode error: {0}")]
    Encode(String),

    /// Well-formed CBOR that is not a COSE_Sign1 structure.
    #[error("not a COSE_Sign1: {0}")]
    NotSign1(String),

    /// A header map holds a value of the wrong type or a duplicate label.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// Detaching from an envelope whose payload is already nil.
    #[error("payload is already detached")]
    PayloadDetached,

    /// Attaching to an envelope that still carries a payload.
    #[error("payload slot is not empty; expected a detached envelope")]
    PayloadNotDetached,

    /// The signature does not verify under the resolved key.
    #[error("signature invalid: {0}")]
    SignatureInvalid(String),

    /// Key material could not be parsed or resolved.
    #[error("key error: {0}")]
    Key(String),

    /// The requested algorithm differs from the signer's.
    #[error("algorithm mismatch: requested {requested}, signer uses {signer}")]
    AlgorithmMismatch {
        /// Algorithm in the issuer parameters.
        requested: i64,
        /// Algorithm the signer produces.
        signer: i64,
    },
}

impl From<CryptoError> for CoseError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::VerificationFailed(msg) => Self::SignatureInvalid(msg),
            CryptoError::KeyError(msg) => Self::Key(msg),
        }
    }
}

/// How a relying party should treat a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The receipt was processed and does not hold.
    Untrusted,
    /// The receipt or request could not be processed at all.
    Unprocessable,
}

/// Top-level error type for receipt issuance and verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReceiptError {
    /// Hash-tree failure.
    #[error("merkle error: {0}")]
    Merkle(#[from] MerkleError),

    /// Envelope failure.
    #[error("envelope error: {0}")]
    Cose(#[from] CoseError),

    /// The header extension carries no proof of the required kind.
    #[error("receipt carries no {0}")]
    MissingProof(ProofKind),

    /// A proof could not be decoded, or the receipt carries proofs in a
    /// combination the operation does not accept.
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    /// The protected header names a structure this verifier does not handle.
    #[error("unsupported verifiable data structure: expected {expected}, got {actual}")]
    UnsupportedStructure {
        /// The structure this verification path handles.
        expected: VerifiableDataStructure,
        /// The label value found in the protected header.
        actual: i64,
    },

    /// Two receipts cannot be merged because they sign different content.
    #[error("incompatible receipts: {0}")]
    IncompatibleReceipts(String),
}

impl ReceiptError {
    /// Classify this failure.
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Merkle(MerkleError::RootMismatch)
            | Self::Cose(CoseError::SignatureInvalid(_)) => FailureClass::Untrusted,
            _ => FailureClass::Unprocessable,
        }
    }

    /// Whether this failure is a cryptographic rejection rather than an
    /// inability to process.
    pub fn is_untrusted(&self) -> bool {
        self.class() == FailureClass::Untrusted
    }
}
