//! # scitt-crypto — Hash Trees and Keys
//!
//! Provides the cryptographic building blocks for transparency receipts:
//!
//! - **Hash functions** behind the [`HashFunction`] trait, with SHA-256 as
//!   the default.
//! - **RFC 9162 hash tree** ([`merkle`]): leaf hashing, root computation,
//!   inclusion and consistency proof construction and verification.
//! - **CCF ledger profile** ([`ccf`]): leaf validation, leaf hashing, and
//!   root recomputation from a direction-tagged path.
//! - **Ed25519** key generation and signing used by the COSE layer.
//!
//! ## Crate Policy
//!
//! - Depends only on `scitt-core` internally.
//! - Everything here is pure and synchronous. Trees are passed in as leaf
//!   slices and never retained.
//! - No mocking of cryptographic operations in tests. All tests use real
//!   SHA-256 and real Ed25519.

pub mod ccf;
pub mod ed25519;
pub mod hash;
pub mod merkle;

pub use ccf::{CcfInclusionProof, CcfLeaf, CcfPathStep, LedgerProfile};
pub use ed25519::{Ed25519PublicKey, Ed25519Signature, SigningKey};
pub use hash::{HashFunction, Sha256Hash};
pub use merkle::{ConsistencyProof, HashTree, InclusionProof};
