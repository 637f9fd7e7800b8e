//! # scitt-core — Foundational Types for Merkle Tree Receipts
//!
//! This crate defines the primitives shared by every other crate in the
//! workspace. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`Digest` newtype.** Leaf hashes, interior nodes, and roots are all
//!    fixed 32-byte values. Length is enforced at construction, so no code
//!    path downstream ever handles a short or long hash.
//!
//! 2. **Registered labels in one place.** The COSE header labels and
//!    verifiable-data-structure identifiers used on the wire are defined
//!    once in [`label`] and matched exhaustively everywhere else.
//!
//! 3. **One error taxonomy.** Tree, envelope, and protocol failures are
//!    distinct `thiserror` enums that compose into [`ReceiptError`], which
//!    classifies each failure as untrusted or unprocessable.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `scitt-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod hex;
pub mod label;

// Re-export primary types for ergonomic imports.
pub use digest::{Digest, DIGEST_LEN};
pub use error::{CoseError, CryptoError, FailureClass, MerkleError, ReceiptError};
pub use label::{Algorithm, HeaderLabel, ProofKind, VerifiableDataStructure};
