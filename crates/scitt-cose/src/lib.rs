//! # scitt-cose — COSE_Sign1 Envelopes for Receipts
//!
//! The envelope layer of the receipt protocol:
//!
//! - [`sign1`]: the COSE_Sign1 structure (tag 18) and its protected header.
//! - [`header`]: the typed view of the unprotected header, holding
//!   verifiable data proofs (label 396) and accumulated receipts (label 394).
//! - [`binding`]: attach/detach a payload and get/set the header extension
//!   on already-signed envelopes.
//! - [`proof`]: CBOR encodings for RFC 9162 and CCF proofs.
//! - [`signer`]: the `Signer` / `Verifier` capabilities and their Ed25519
//!   implementation over the RFC 9052 `Sig_structure`.
//!
//! ## Crate Policy
//!
//! - CBOR goes through `ciborium::Value`. Byte strings and integers are
//!   carried through decode/encode unchanged, and the protected header is
//!   kept as the exact bytes that were signed.
//! - Envelope operations take values or byte slices and return new ones.
//!   Nothing is mutated in place.

pub(crate) mod cbor;

pub mod binding;
pub mod header;
pub mod proof;
pub mod sign1;
pub mod signer;

pub use binding::{attach_payload, detach_payload, get_header_extension, set_header_extension};
pub use header::HeaderExtension;
pub use sign1::{CoseSign1, ProtectedHeader, COSE_SIGN1_TAG};
pub use signer::{Ed25519Signer, Ed25519Verifier, Signer, Verifier};
