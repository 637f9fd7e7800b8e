//! # scitt-receipt — Transparency Receipt Protocol
//!
//! Binds Merkle tree proofs to COSE_Sign1 signatures:
//!
//! - [`protocol`]: RFC 9162 receipts. Sign a root, issue and verify
//!   inclusion receipts (single and multi-proof), issue and verify
//!   consistency receipts, merge inclusion receipts.
//! - [`ccf`]: receipts for the CCF ledger profile.
//! - [`statement`]: add, list, and strip receipts on a signed statement.
//! - [`lifecycle`]: the receipt typestate (`Signed` → `Detached` →
//!   `Attached` → verdict) every operation above is built from.
//!
//! ## Detached-payload convention
//!
//! The issuer signs the tree root as an attached payload, stores the proof
//! in the unprotected header, and detaches the payload. A verifier decodes
//! the proof, recomputes the root, reattaches it, and checks the signature.
//! A receipt therefore verifies only for the leaf (or old root) its proof
//! was built for.
//!
//! ## Crate Policy
//!
//! - Stateless. Signers and verifiers are passed per call as trait
//!   objects; there is no process-wide default.
//! - Only the final cryptographic outcome becomes `Ok(false)`. Malformed
//!   or missing proofs are errors.

pub mod ccf;
pub mod lifecycle;
pub mod protocol;
pub mod statement;

pub use ccf::LedgerReceipts;
pub use lifecycle::{Attached, Detached, Receipt, Signed, Verdict};
pub use protocol::{Issuer, ReceiptProtocol};
pub use statement::{add_receipt, receipts, remove_receipts};
