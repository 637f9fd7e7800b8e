//! # Registered Labels
//!
//! Integer labels used on the wire: COSE header parameters, proof kinds
//! inside the verifiable-data-proofs map, verifiable data structure
//! identifiers, and signature algorithm identifiers.
//!
//! ```text
//! protected   { 1: alg, 4: kid, 395: vds }
//! unprotected { 396: { -1: [inclusion...], -2: [consistency...] },
//!               394: [receipt...] }
//! ```

use serde::{Deserialize, Serialize};

/// COSE header parameters understood by this workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderLabel {
    /// Signature algorithm (protected).
    Alg,
    /// Key identifier.
    Kid,
    /// Receipts accumulated on a signed statement (unprotected).
    Receipts,
    /// Verifiable data structure the proofs belong to (protected).
    VerifiableDataStructure,
    /// Map of proof kind to serialized proofs (unprotected).
    VerifiableDataProofs,
}

impl HeaderLabel {
    /// The registered integer label.
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Alg => 1,
            Self::Kid => 4,
            Self::Receipts => 394,
            Self::VerifiableDataStructure => 395,
            Self::VerifiableDataProofs => 396,
        }
    }

    /// Look up a known label.
    pub fn from_i64(label: i64) -> Option<Self> {
        match label {
            1 => Some(Self::Alg),
            4 => Some(Self::Kid),
            394 => Some(Self::Receipts),
            395 => Some(Self::VerifiableDataStructure),
            396 => Some(Self::VerifiableDataProofs),
            _ => None,
        }
    }
}

/// Keys of the verifiable-data-proofs map.
///
/// Unknown kinds are carried through untouched so that a receipt produced
/// by a newer issuer survives a round trip through this code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProofKind {
    /// `-1`: inclusion proofs.
    Inclusion,
    /// `-2`: consistency proofs.
    Consistency,
    /// Any other integer key.
    Other(i64),
}

impl ProofKind {
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Inclusion => -1,
            Self::Consistency => -2,
            Self::Other(v) => v,
        }
    }

    pub const fn from_i64(v: i64) -> Self {
        match v {
            -1 => Self::Inclusion,
            -2 => Self::Consistency,
            other => Self::Other(other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inclusion => "inclusion",
            Self::Consistency => "consistency",
            Self::Other(_) => "other",
        }
    }
}

impl std::fmt::Display for ProofKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Other(v) => write!(f, "proof kind {v}"),
            known => write!(f, "{} proof", known.as_str()),
        }
    }
}

/// The tree profile a receipt's proofs were produced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerifiableDataStructure {
    /// RFC 9162 binary Merkle tree over SHA-256.
    Rfc9162Sha256,
    /// CCF ledger tree over SHA-256.
    CcfLedgerSha256,
}

impl VerifiableDataStructure {
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Rfc9162Sha256 => 1,
            Self::CcfLedgerSha256 => 2,
        }
    }

    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            1 => Some(Self::Rfc9162Sha256),
            2 => Some(Self::CcfLedgerSha256),
            _ => None,
        }
    }
}

impl std::fmt::Display for VerifiableDataStructure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rfc9162Sha256 => f.write_str("RFC9162_SHA256"),
            Self::CcfLedgerSha256 => f.write_str("CCF_LEDGER_SHA256"),
        }
    }
}

/// A COSE signature algorithm identifier.
///
/// Kept as an open integer: the protocol only compares it against the
/// signer's own identifier and writes it into the protected header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Algorithm(pub i64);

impl Algorithm {
    /// EdDSA (Ed25519).
    pub const EDDSA: Self = Self(-8);
    /// ECDSA w/ SHA-256.
    pub const ES256: Self = Self(-7);
    /// ECDSA w/ SHA-384.
    pub const ES384: Self = Self(-35);

    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::EDDSA => f.write_str("EdDSA"),
            Self::ES256 => f.write_str("ES256"),
            Self::ES384 => f.write_str("ES384"),
            Self(other) => write!(f, "alg({other})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_label_values() {
        assert_eq!(HeaderLabel::Receipts.as_i64(), 394);
        assert_eq!(HeaderLabel::VerifiableDataStructure.as_i64(), 395);
        assert_eq!(HeaderLabel::VerifiableDataProofs.as_i64(), 396);
        for label in [
            HeaderLabel::Alg,
            HeaderLabel::Kid,
            HeaderLabel::Receipts,
            HeaderLabel::VerifiableDataStructure,
            HeaderLabel::VerifiableDataProofs,
        ] {
            assert_eq!(HeaderLabel::from_i64(label.as_i64()), Some(label));
        }
        assert_eq!(HeaderLabel::from_i64(100), None);
    }

    #[test]
    fn test_proof_kind_roundtrip_and_order() {
        assert_eq!(ProofKind::from_i64(-1), ProofKind::Inclusion);
        assert_eq!(ProofKind::from_i64(-2), ProofKind::Consistency);
        assert_eq!(ProofKind::from_i64(-7), ProofKind::Other(-7));
        assert_eq!(ProofKind::Other(-7).as_i64(), -7);
        assert!(ProofKind::Inclusion < ProofKind::Consistency);
        assert!(ProofKind::Consistency < ProofKind::Other(-3));
    }

    #[test]
    fn test_vds_values() {
        assert_eq!(VerifiableDataStructure::Rfc9162Sha256.as_i64(), 1);
        assert_eq!(VerifiableDataStructure::CcfLedgerSha256.as_i64(), 2);
        assert_eq!(VerifiableDataStructure::from_i64(3), None);
        assert_eq!(
            VerifiableDataStructure::CcfLedgerSha256.to_string(),
            "CCF_LEDGER_SHA256"
        );
    }

    #[test]
    fn test_algorithm_display() {
        assert_eq!(Algorithm::EDDSA.to_string(), "EdDSA");
        assert_eq!(Algorithm(-999).to_string(), "alg(-999)");
    }
}
