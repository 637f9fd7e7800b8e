//! # CCF Ledger Profile
//!
//! The `CCF_LEDGER_SHA256` verifiable data structure. A CCF leaf commits to
//! the ledger's internal transaction hash, its internal evidence string,
//! and the digest of the registered data; the path carries an explicit
//! direction flag per step instead of deriving directions from an index.
//!
//! ## Algorithm
//!
//! - Leaf: `H(internal_transaction_hash || H(internal_evidence) || data_hash)`.
//! - Path step: `H(step.hash || acc)` when `step.left`, otherwise
//!   `H(acc || step.hash)`. No domain-separation prefix.
//!
//! ## Security Invariant
//!
//! Leaves are validated before any hashing. The proof types here are
//! distinct from [`crate::merkle::InclusionProof`], so a CCF proof cannot
//! be handed to the RFC 9162 verifier or the reverse.

use serde::{Deserialize, Serialize};

use scitt_core::{Digest, MerkleError, DIGEST_LEN};

use crate::hash::{HashFunction, Sha256Hash};

/// Maximum length of `internal_evidence`, in bytes.
pub const MAX_EVIDENCE_LEN: usize = 1024;

/// A CCF ledger leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CcfLeaf {
    pub internal_transaction_hash: Digest,
    pub internal_evidence: String,
    pub data_hash: Digest,
}

/// One step of a CCF audit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CcfPathStep {
    /// The sibling sits to the left of the accumulator.
    pub left: bool,
    pub hash: Digest,
}

/// A CCF inclusion proof: a leaf and the path from it to the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CcfInclusionProof {
    pub leaf: CcfLeaf,
    pub path: Vec<CcfPathStep>,
}

impl CcfLeaf {
    /// Build a leaf from raw field bytes, validating every field.
    pub fn new(
        internal_transaction_hash: &[u8],
        internal_evidence: impl Into<String>,
        data_hash: &[u8],
    ) -> Result<Self, MerkleError> {
        let internal_transaction_hash = Digest::from_slice(internal_transaction_hash)
            .ok_or_else(|| {
                MerkleError::InvalidLeaf(format!(
                    "internal_transaction_hash must be {DIGEST_LEN} bytes, got {}",
                    internal_transaction_hash.len()
                ))
            })?;
        let data_hash = Digest::from_slice(data_hash).ok_or_else(|| {
            MerkleError::InvalidLeaf(format!(
                "data_hash must be {DIGEST_LEN} bytes, got {}",
                data_hash.len()
            ))
        })?;
        let leaf = Self {
            internal_transaction_hash,
            internal_evidence: internal_evidence.into(),
            data_hash,
        };
        leaf.validate()?;
        Ok(leaf)
    }

    /// Check the evidence length bounds.
    ///
    /// Hash lengths are fixed by [`Digest`]; this re-checks the one field
    /// a deserialized leaf can still get wrong.
    pub fn validate(&self) -> Result<(), MerkleError> {
        let len = self.internal_evidence.len();
        if len == 0 || len > MAX_EVIDENCE_LEN {
            return Err(MerkleError::InvalidLeaf(format!(
                "internal_evidence must be 1..={MAX_EVIDENCE_LEN} bytes, got {len}"
            )));
        }
        Ok(())
    }
}

/// CCF ledger tree operations over an injected hash function.
#[derive(Debug, Clone, Default)]
pub struct LedgerProfile<H = Sha256Hash> {
    hasher: H,
}

impl LedgerProfile<Sha256Hash> {
    /// `CCF_LEDGER_SHA256`.
    pub fn sha256() -> Self {
        Self { hasher: Sha256Hash }
    }
}

impl<H: HashFunction> LedgerProfile<H> {
    pub fn new(hasher: H) -> Self {
        Self { hasher }
    }

    /// Hash a validated leaf.
    pub fn leaf_hash(&self, leaf: &CcfLeaf) -> Result<Digest, MerkleError> {
        leaf.validate()?;
        let evidence_hash = self.hasher.hash(leaf.internal_evidence.as_bytes());
        Ok(self.hasher.hash_parts(&[
            leaf.internal_transaction_hash.as_bytes(),
            evidence_hash.as_bytes(),
            leaf.data_hash.as_bytes(),
        ]))
    }

    /// Fold the path over the leaf hash to recover the signed root.
    pub fn compute_root(&self, proof: &CcfInclusionProof) -> Result<Digest, MerkleError> {
        let mut acc = self.leaf_hash(&proof.leaf)?;
        for step in &proof.path {
            acc = if step.left {
                self.hasher
                    .hash_parts(&[step.hash.as_bytes(), acc.as_bytes()])
            } else {
                self.hasher
                    .hash_parts(&[acc.as_bytes(), step.hash.as_bytes()])
            };
        }
        Ok(acc)
    }

    /// Build the path steps proving `leaves[index]` in a complete binary
    /// tree laid out the way the CCF ledger lays it out.
    ///
    /// Levels are paired left to right; an unpaired last node is promoted
    /// unchanged. Returns the proof together with the root it folds to.
    pub fn inclusion_proof(
        &self,
        leaves: &[CcfLeaf],
        index: u64,
    ) -> Result<(CcfInclusionProof, Digest), MerkleError> {
        let tree_size = leaves.len() as u64;
        if index >= tree_size {
            return Err(MerkleError::IndexOutOfRange { index, tree_size });
        }
        let mut level: Vec<Digest> = leaves
            .iter()
            .map(|l| self.leaf_hash(l))
            .collect::<Result<_, _>>()?;
        let mut pos = index as usize;
        let mut path = Vec::new();

        while level.len() > 1 {
            let sibling = pos ^ 1;
            if sibling < level.len() {
                path.push(CcfPathStep {
                    left: sibling < pos,
                    hash: level[sibling],
                });
            }
            level = level
                .chunks(2)
                .map(|pair| match pair.get(1) {
                    Some(r) => self.hasher.hash_parts(&[pair[0].as_bytes(), r.as_bytes()]),
                    None => pair[0],
                })
                .collect();
            pos /= 2;
        }

        let proof = CcfInclusionProof {
            leaf: leaves[index as usize].clone(),
            path,
        };
        Ok((proof, level[0]))
    }
}

/// Recover the leaf index a path implies, reading direction bits
/// bottom-up. Only meaningful for paths with no promoted levels.
pub fn implied_index(proof: &CcfInclusionProof) -> u64 {
    proof
        .path
        .iter()
        .enumerate()
        .filter(|(_, step)| step.left)
        .fold(0u64, |acc, (depth, _)| acc | 1u64.checked_shl(depth as u32).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    fn leaf(i: u8) -> CcfLeaf {
        CcfLeaf::new(&[i; 32], format!("evidence-{i}"), &[0xd0 ^ i; 32]).unwrap()
    }

    #[test]
    fn test_leaf_hash_composition() {
        let profile = LedgerProfile::sha256();
        let l = leaf(1);
        let mut buf = Vec::new();
        buf.extend_from_slice(l.internal_transaction_hash.as_bytes());
        buf.extend_from_slice(sha256(l.internal_evidence.as_bytes()).as_bytes());
        buf.extend_from_slice(l.data_hash.as_bytes());
        assert_eq!(profile.leaf_hash(&l).unwrap(), sha256(&buf));
    }

    #[test]
    fn test_left_flag_controls_order() {
        let profile = LedgerProfile::sha256();
        let l = leaf(2);
        let sibling = Digest::new([7u8; 32]);
        let lh = profile.leaf_hash(&l).unwrap();

        let right = CcfInclusionProof {
            leaf: l.clone(),
            path: vec![CcfPathStep {
                left: false,
                hash: sibling,
            }],
        };
        let mut expected = lh.to_vec();
        expected.extend_from_slice(sibling.as_bytes());
        assert_eq!(profile.compute_root(&right).unwrap(), sha256(&expected));

        let left = CcfInclusionProof {
            leaf: l,
            path: vec![CcfPathStep {
                left: true,
                hash: sibling,
            }],
        };
        let mut expected = sibling.to_vec();
        expected.extend_from_slice(lh.as_bytes());
        assert_eq!(profile.compute_root(&left).unwrap(), sha256(&expected));
    }

    #[test]
    fn test_empty_path_root_is_leaf_hash() {
        let profile = LedgerProfile::sha256();
        let proof = CcfInclusionProof {
            leaf: leaf(3),
            path: vec![],
        };
        assert_eq!(
            profile.compute_root(&proof).unwrap(),
            profile.leaf_hash(&proof.leaf).unwrap()
        );
    }

    #[test]
    fn test_short_transaction_hash_rejected() {
        let err = CcfLeaf::new(&[0u8; 31], "e", &[0u8; 32]).unwrap_err();
        assert!(matches!(err, MerkleError::InvalidLeaf(ref m) if m.contains("internal_transaction_hash")));
    }

    #[test]
    fn test_long_data_hash_rejected() {
        let err = CcfLeaf::new(&[0u8; 32], "e", &[0u8; 33]).unwrap_err();
        assert!(matches!(err, MerkleError::InvalidLeaf(ref m) if m.contains("data_hash")));
    }

    #[test]
    fn test_evidence_bounds() {
        assert!(CcfLeaf::new(&[0u8; 32], "", &[0u8; 32]).is_err());
        assert!(CcfLeaf::new(&[0u8; 32], "x".repeat(1024), &[0u8; 32]).is_ok());
        assert!(CcfLeaf::new(&[0u8; 32], "x".repeat(1025), &[0u8; 32]).is_err());
    }

    #[test]
    fn test_invalid_leaf_rejected_before_hashing() {
        let profile = LedgerProfile::sha256();
        let mut l = leaf(4);
        l.internal_evidence.clear();
        let proof = CcfInclusionProof {
            leaf: l,
            path: vec![],
        };
        assert!(matches!(
            profile.compute_root(&proof),
            Err(MerkleError::InvalidLeaf(_))
        ));
    }

    #[test]
    fn test_built_proofs_fold_to_same_root() {
        let profile = LedgerProfile::sha256();
        for n in 1..=9u8 {
            let leaves: Vec<CcfLeaf> = (0..n).map(leaf).collect();
            let (_, root) = profile.inclusion_proof(&leaves, 0).unwrap();
            for i in 0..n as u64 {
                let (proof, r) = profile.inclusion_proof(&leaves, i).unwrap();
                assert_eq!(r, root);
                assert_eq!(profile.compute_root(&proof).unwrap(), root, "n={n} i={i}");
            }
        }
    }

    #[test]
    fn test_implied_index_on_full_tree() {
        let profile = LedgerProfile::sha256();
        let leaves: Vec<CcfLeaf> = (0..8).map(leaf).collect();
        for i in 0..8u64 {
            let (proof, _) = profile.inclusion_proof(&leaves, i).unwrap();
            assert_eq!(implied_index(&proof), i);
        }
    }

    #[test]
    fn test_inclusion_index_out_of_range() {
        let profile = LedgerProfile::sha256();
        let leaves: Vec<CcfLeaf> = (0..2).map(leaf).collect();
        assert!(matches!(
            profile.inclusion_proof(&leaves, 2),
            Err(MerkleError::IndexOutOfRange { index: 2, tree_size: 2 })
        ));
    }
}
