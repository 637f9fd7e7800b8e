//! # RFC 9162 Hash Tree
//!
//! The binary Merkle tree used by Certificate Transparency v2 and by the
//! `RFC9162_SHA256` verifiable data structure.
//!
//! ## Algorithm
//!
//! Domain-separated hashing:
//! - Leaf: `H(0x00 || entry)`.
//! - Node: `H(0x01 || left || right)`.
//! - Empty tree: `H("")`.
//!
//! A tree of `n > 1` leaves splits at `k`, the largest power of two strictly
//! less than `n`; the left subtree holds `leaves[..k]`, the right subtree
//! `leaves[k..]`. Proof construction follows the recursive `PATH` and
//! `SUBPROOF` definitions; verification follows the iterative bit-walking
//! procedures of RFC 9162 §2.1.3.2 and §2.1.4.2.
//!
//! ## Security Invariant
//!
//! Verification never trusts a proof's shape. Audit and consistency paths
//! of the wrong length are rejected as `MalformedProof` rather than folded,
//! so a truncated path cannot produce a root for a smaller tree.

use serde::{Deserialize, Serialize};

use scitt_core::{Digest, MerkleError};

use crate::hash::{HashFunction, Sha256Hash};

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

/// Longest audit or consistency path a `u64`-sized tree can need.
pub const MAX_PATH_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Proof types
// ---------------------------------------------------------------------------

/// Evidence that a leaf sits at `leaf_index` in a tree of `tree_size` leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    pub tree_size: u64,
    pub leaf_index: u64,
    /// Sibling hashes, bottom-up.
    pub audit_path: Vec<Digest>,
}

/// Evidence that the first `tree_size_1` leaves of a tree of `tree_size_2`
/// leaves are unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyProof {
    pub tree_size_1: u64,
    pub tree_size_2: u64,
    pub consistency_path: Vec<Digest>,
}

// ---------------------------------------------------------------------------
// HashTree
// ---------------------------------------------------------------------------

/// RFC 9162 tree operations over an injected hash function.
///
/// Holds no leaves. Every operation takes the leaf sequence it works on,
/// so concurrent callers may share one instance freely.
#[derive(Debug, Clone, Default)]
pub struct HashTree<H = Sha256Hash> {
    hasher: H,
}

impl HashTree<Sha256Hash> {
    /// `RFC9162_SHA256`.
    pub fn sha256() -> Self {
        Self { hasher: Sha256Hash }
    }
}

impl<H: HashFunction> HashTree<H> {
    pub fn new(hasher: H) -> Self {
        Self { hasher }
    }

    /// The underlying hash function.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Hash a log entry into a leaf: `H(0x00 || entry)`.
    pub fn leaf(&self, entry: &[u8]) -> Digest {
        self.hasher.hash_parts(&[&[LEAF_PREFIX], entry])
    }

    /// Hash two children into their parent: `H(0x01 || left || right)`.
    pub fn node(&self, left: &Digest, right: &Digest) -> Digest {
        self.hasher
            .hash_parts(&[&[NODE_PREFIX], left.as_bytes(), right.as_bytes()])
    }

    /// Root of the empty tree: `H("")`.
    pub fn empty_root(&self) -> Digest {
        self.hasher.hash(&[])
    }

    /// Merkle tree hash of an ordered leaf sequence.
    pub fn root(&self, leaves: &[Digest]) -> Digest {
        match leaves.len() {
            0 => self.empty_root(),
            1 => leaves[0],
            n => {
                let k = split_point(n);
                self.node(&self.root(&leaves[..k]), &self.root(&leaves[k..]))
            }
        }
    }

    /// Build the audit path for `leaf_index`.
    pub fn inclusion_proof(
        &self,
        leaves: &[Digest],
        leaf_index: u64,
    ) -> Result<InclusionProof, MerkleError> {
        let tree_size = leaves.len() as u64;
        if leaf_index >= tree_size {
            return Err(MerkleError::IndexOutOfRange {
                index: leaf_index,
                tree_size,
            });
        }
        let mut audit_path = Vec::new();
        self.path(leaf_index as usize, leaves, &mut audit_path);
        Ok(InclusionProof {
            tree_size,
            leaf_index,
            audit_path,
        })
    }

    /// Recompute the root implied by `leaf` and `proof`.
    ///
    /// Returns the candidate root; comparing it against a trusted root (or
    /// handing it to a signature check) is the caller's job. Fails only when
    /// the proof's shape is inconsistent with its own tree size.
    pub fn verify_inclusion_proof(
        &self,
        leaf: &Digest,
        proof: &InclusionProof,
    ) -> Result<Digest, MerkleError> {
        if proof.leaf_index >= proof.tree_size {
            return Err(MerkleError::MalformedProof(format!(
                "leaf index {} not below tree size {}",
                proof.leaf_index, proof.tree_size
            )));
        }
        if proof.audit_path.len() > MAX_PATH_LEN {
            return Err(MerkleError::MalformedProof(format!(
                "audit path of {} hashes exceeds {MAX_PATH_LEN}",
                proof.audit_path.len()
            )));
        }

        let mut fn_ = proof.leaf_index;
        let mut sn = proof.tree_size - 1;
        let mut r = *leaf;

        for p in &proof.audit_path {
            if sn == 0 {
                return Err(MerkleError::MalformedProof(
                    "audit path longer than tree height".into(),
                ));
            }
            if fn_ & 1 == 1 || fn_ == sn {
                r = self.node(p, &r);
                while fn_ & 1 == 0 && fn_ != 0 {
                    fn_ >>= 1;
                    sn >>= 1;
                }
            } else {
                r = self.node(&r, p);
            }
            fn_ >>= 1;
            sn >>= 1;
        }

        if sn != 0 {
            return Err(MerkleError::MalformedProof(
                "audit path shorter than tree height".into(),
            ));
        }
        Ok(r)
    }

    /// Build a proof that the first `old_tree_size` leaves are a prefix of
    /// `leaves`.
    pub fn consistency_proof(
        &self,
        old_tree_size: u64,
        leaves: &[Digest],
    ) -> Result<ConsistencyProof, MerkleError> {
        let new_size = leaves.len() as u64;
        if old_tree_size == 0 || old_tree_size > new_size {
            return Err(MerkleError::InvalidRange {
                old_size: old_tree_size,
                new_size,
            });
        }
        let mut consistency_path = Vec::new();
        self.subproof(old_tree_size as usize, leaves, true, &mut consistency_path);
        Ok(ConsistencyProof {
            tree_size_1: old_tree_size,
            tree_size_2: new_size,
            consistency_path,
        })
    }

    /// Recompute the new root from a trusted `old_root` and `proof`.
    ///
    /// Returns the candidate root of the larger tree. Fails with
    /// `RootMismatch` when the path does not reproduce `old_root`, and with
    /// `MalformedProof` when its shape is inconsistent with the sizes.
    pub fn verify_consistency_proof(
        &self,
        old_root: &Digest,
        proof: &ConsistencyProof,
    ) -> Result<Digest, MerkleError> {
        let (size1, size2) = (proof.tree_size_1, proof.tree_size_2);
        if size1 == 0 || size1 > size2 {
            return Err(MerkleError::MalformedProof(format!(
                "tree sizes {size1} -> {size2} are not a valid prefix relation"
            )));
        }
        if proof.consistency_path.len() > MAX_PATH_LEN {
            return Err(MerkleError::MalformedProof(format!(
                "consistency path of {} hashes exceeds {MAX_PATH_LEN}",
                proof.consistency_path.len()
            )));
        }
        if size1 == size2 {
            if !proof.consistency_path.is_empty() {
                return Err(MerkleError::MalformedProof(
                    "equal tree sizes require an empty consistency path".into(),
                ));
            }
            return Ok(*old_root);
        }

        let mut path = proof.consistency_path.iter();
        let seed = if size1.is_power_of_two() {
            *old_root
        } else {
            *path.next().ok_or_else(|| {
                MerkleError::MalformedProof("empty consistency path".into())
            })?
        };

        let mut fn_ = size1 - 1;
        let mut sn = size2 - 1;
        while fn_ & 1 == 1 {
            fn_ >>= 1;
            sn >>= 1;
        }

        let mut fr = seed;
        let mut sr = seed;
        for c in path {
            if sn == 0 {
                return Err(MerkleError::MalformedProof(
                    "consistency path longer than expected".into(),
                ));
            }
            if fn_ & 1 == 1 || fn_ == sn {
                fr = self.node(c, &fr);
                sr = self.node(c, &sr);
                while fn_ & 1 == 0 && fn_ != 0 {
                    fn_ >>= 1;
                    sn >>= 1;
                }
            } else {
                sr = self.node(&sr, c);
            }
            fn_ >>= 1;
            sn >>= 1;
        }

        if sn != 0 {
            return Err(MerkleError::MalformedProof(
                "consistency path shorter than expected".into(),
            ));
        }
        if fr != *old_root {
            return Err(MerkleError::RootMismatch);
        }
        Ok(sr)
    }

    // -----------------------------------------------------------------------
    // Recursive construction
    // -----------------------------------------------------------------------

    /// `PATH(m, D[n])`: deeper siblings are pushed first.
    fn path(&self, m: usize, leaves: &[Digest], out: &mut Vec<Digest>) {
        let n = leaves.len();
        if n <= 1 {
            return;
        }
        let k = split_point(n);
        if m < k {
            self.path(m, &leaves[..k], out);
            out.push(self.root(&leaves[k..]));
        } else {
            self.path(m - k, &leaves[k..], out);
            out.push(self.root(&leaves[..k]));
        }
    }

    /// `SUBPROOF(m, D[n], b)`.
    fn subproof(&self, m: usize, leaves: &[Digest], complete: bool, out: &mut Vec<Digest>) {
        let n = leaves.len();
        if m == n {
            if !complete {
                out.push(self.root(leaves));
            }
            return;
        }
        let k = split_point(n);
        if m <= k {
            self.subproof(m, &leaves[..k], complete, out);
            out.push(self.root(&leaves[k..]));
        } else {
            self.subproof(m - k, &leaves[k..], false, out);
            out.push(self.root(&leaves[..k]));
        }
    }
}

/// Largest power of two strictly less than `n` (`n >= 2`).
fn split_point(n: usize) -> usize {
    debug_assert!(n >= 2);
    let mut k = 1;
    while k << 1 < n {
        k <<= 1;
    }
    k
}
