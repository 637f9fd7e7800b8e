//! # RFC 9162 Receipt Protocol
//!
//! Issues and verifies receipts for the `RFC9162_SHA256` verifiable data
//! structure.
//!
//! | Operation | Header content | Signed payload |
//! |---|---|---|
//! | `sign_root` | none | root |
//! | `sign_inclusion_proof(s)` | 396 / -1: one proof per index | root |
//! | `sign_consistency_proof` | 396 / -2: one proof | new root |
//!
//! Every verification decodes the detached receipt, checks the verifiable
//! data structure, decodes the proof, recomputes the root, reattaches it,
//! and calls the verifier exactly once. The signature check is the only
//! step whose failure is reported as `Ok(false)`; consistency proofs that
//! do not reproduce the trusted old root and multi-proof receipts whose
//! proofs disagree on the root are rejected the same way, since neither
//! root can be the one that was signed.

use tracing::{debug, warn};

use scitt_core::{
    Algorithm, CoseError, Digest, MerkleError, ProofKind, ReceiptError, VerifiableDataStructure,
};
use scitt_cose::proof::{
    decode_consistency_proof, decode_inclusion_proof, encode_consistency_proof,
    encode_inclusion_proof,
};
use scitt_cose::{HeaderExtension, ProtectedHeader, Signer, Verifier};
use scitt_crypto::merkle::{HashTree, InclusionProof};
use scitt_crypto::{HashFunction, Sha256Hash};

use crate::lifecycle::{Detached, Receipt, Signed, Verdict};

const STRUCTURE: VerifiableDataStructure = VerifiableDataStructure::Rfc9162Sha256;

/// Issuer parameters written into every protected header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issuer {
    pub alg: Algorithm,
    pub kid: Vec<u8>,
}

impl Issuer {
    pub fn new(alg: Algorithm, kid: impl Into<Vec<u8>>) -> Self {
        Self {
            alg,
            kid: kid.into(),
        }
    }

    /// Protected header for `signer`, which must produce `self.alg`.
    pub fn protected_header(
        &self,
        signer: &dyn Signer,
        vds: VerifiableDataStructure,
    ) -> Result<ProtectedHeader, ReceiptError> {
        if signer.algorithm() != self.alg {
            return Err(CoseError::AlgorithmMismatch {
                requested: self.alg.as_i64(),
                signer: signer.algorithm().as_i64(),
            }
            .into());
        }
        Ok(ProtectedHeader::new(self.alg)
            .with_kid(self.kid.clone())
            .with_structure(vds))
    }
}

/// Stateless RFC 9162 receipt issuance and verification.
#[derive(Debug, Clone, Default)]
pub struct ReceiptProtocol<H = Sha256Hash> {
    tree: HashTree<H>,
}

impl ReceiptProtocol<Sha256Hash> {
    pub fn sha256() -> Self {
        Self {
            tree: HashTree::sha256(),
        }
    }
}

impl<H: HashFunction> ReceiptProtocol<H> {
    pub fn new(tree: HashTree<H>) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &HashTree<H> {
        &self.tree
    }

    // -----------------------------------------------------------------------
    // Issuance
    // -----------------------------------------------------------------------

    /// Sign the root of `leaves`.
    ///
    /// Without a signer this returns the raw 32 root bytes; with one it
    /// returns a COSE_Sign1 carrying the root as an attached payload.
    pub fn sign_root(
        &self,
        leaves: &[Digest],
        signer: Option<&dyn Signer>,
        issuer: &Issuer,
    ) -> Result<Vec<u8>, ReceiptError> {
        let root = self.tree.root(leaves);
        let Some(signer) = signer else {
            return Ok(root.to_vec());
        };
        let protected = issuer.protected_header(signer, STRUCTURE)?;
        let signed = Receipt::<Signed>::sign(signer, &protected, &root)?;
        debug!(tree_size = leaves.len(), root = %root, "signed tree root");
        Ok(signed.envelope().to_bytes()?)
    }

    /// Issue a receipt proving `leaves[leaf_index]`.
    pub fn sign_inclusion_proof(
        &self,
        leaves: &[Digest],
        leaf_index: u64,
        signer: &dyn Signer,
        issuer: &Issuer,
    ) -> Result<Vec<u8>, ReceiptError> {
        self.sign_inclusion_proofs(leaves, &[leaf_index], signer, issuer)
    }

    /// Issue one receipt carrying an inclusion proof for each index, all
    /// under a single signature over the root.
    pub fn sign_inclusion_proofs(
        &self,
        leaves: &[Digest],
        leaf_indices: &[u64],
        signer: &dyn Signer,
        issuer: &Issuer,
    ) -> Result<Vec<u8>, ReceiptError> {
        if leaf_indices.is_empty() {
            return Err(ReceiptError::MalformedProof(
                "no leaf indices requested".into(),
            ));
        }
        let mut ext = HeaderExtension::new();
        for &index in leaf_indices {
            let proof = self.tree.inclusion_proof(leaves, index)?;
            ext.push_proof(ProofKind::Inclusion, encode_inclusion_proof(&proof)?);
        }
        let root = self.tree.root(leaves);
        let receipt = self.issue(signer, issuer, &root, ext)?;
        debug!(
            tree_size = leaves.len(),
            proofs = leaf_indices.len(),
            "issued inclusion receipt"
        );
        Ok(receipt)
    }

    /// Issue a receipt proving that the tree `previous_receipt` was issued
    /// for is a prefix of `leaves`.
    pub fn sign_consistency_proof(
        &self,
        leaves: &[Digest],
        previous_receipt: &[u8],
        signer: &dyn Signer,
        issuer: &Issuer,
    ) -> Result<Vec<u8>, ReceiptError> {
        let previous = Receipt::<Detached>::from_bytes(previous_receipt)?;
        previous.require_structure(STRUCTURE)?;
        let old_size = previous_tree_size(&previous)?;

        let proof = self.tree.consistency_proof(old_size, leaves)?;
        let ext = HeaderExtension::new()
            .with_proof(ProofKind::Consistency, encode_consistency_proof(&proof)?);
        let root = self.tree.root(leaves);
        let receipt = self.issue(signer, issuer, &root, ext)?;
        debug!(
            tree_size_1 = proof.tree_size_1,
            tree_size_2 = proof.tree_size_2,
            "issued consistency receipt"
        );
        Ok(receipt)
    }

    /// Combine the inclusion proofs of two receipts over the same signed
    /// root into one receipt.
    ///
    /// Both receipts must carry identical protected headers and signatures.
    /// The result keeps every other header entry of `receipt`.
    pub fn merge_inclusion_proofs(
        &self,
        receipt: &[u8],
        other: &[u8],
    ) -> Result<Vec<u8>, ReceiptError> {
        let a = Receipt::<Detached>::from_bytes(receipt)?;
        let b = Receipt::<Detached>::from_bytes(other)?;
        if a.envelope().protected != b.envelope().protected {
            return Err(ReceiptError::IncompatibleReceipts(
                "protected headers differ".into(),
            ));
        }
        if a.envelope().signature != b.envelope().signature {
            return Err(ReceiptError::IncompatibleReceipts(
                "signatures differ".into(),
            ));
        }
        let mut ext = a.header_extension().clone();
        let mut merged = ext.inclusion_proofs().to_vec();
        merged.extend(b.header_extension().inclusion_proofs().iter().cloned());
        ext.set_proofs(ProofKind::Inclusion, merged);
        a.with_header_extension(ext).to_bytes()
    }

    /// Append `receipt` to a signed statement. See [`crate::add_receipt`].
    pub fn add_receipt(&self, statement: &[u8], receipt: &[u8]) -> Result<Vec<u8>, ReceiptError> {
        crate::statement::add_receipt(statement, receipt)
    }

    /// Leaf hash a log registers for `statement`: the RFC 9162 leaf of the
    /// statement with its unprotected header cleared.
    pub fn statement_leaf(&self, statement: &[u8]) -> Result<Digest, ReceiptError> {
        let stripped = crate::statement::remove_receipts(statement)?;
        Ok(self.tree.leaf(&stripped))
    }

    // -----------------------------------------------------------------------
    // Verification
    // -----------------------------------------------------------------------

    /// Verify every receipt carried by `statement` as an inclusion receipt
    /// for [`Self::statement_leaf`]. One outcome per receipt, in the order
    /// they were added; a statement without receipts yields an empty list.
    pub fn verify_statement_receipts(
        &self,
        statement: &[u8],
        verifier: &dyn Verifier,
    ) -> Result<Vec<bool>, ReceiptError> {
        let leaf = self.statement_leaf(statement)?;
        crate::statement::receipts(statement)?
            .iter()
            .map(|receipt| self.verify_inclusion_proof(&leaf, receipt, verifier))
            .collect()
    }

    /// Verify a single-proof inclusion receipt for `leaf`.
    pub fn verify_inclusion_proof(
        &self,
        leaf: &Digest,
        receipt: &[u8],
        verifier: &dyn Verifier,
    ) -> Result<bool, ReceiptError> {
        Ok(self.verified_inclusion_root(leaf, receipt, verifier)?.is_some())
    }

    /// As [`verify_inclusion_proof()`](Self::verify_inclusion_proof), but
    /// returns the verified root.
    ///
    /// A receipt carrying more than one inclusion proof is refused here;
    /// use [`verify_multiple()`](Self::verify_multiple) for those.
    pub fn verified_inclusion_root(
        &self,
        leaf: &Digest,
        receipt: &[u8],
        verifier: &dyn Verifier,
    ) -> Result<Option<Digest>, ReceiptError> {
        let detached = Receipt::<Detached>::from_bytes(receipt)?;
        detached.require_structure(STRUCTURE)?;
        let encoded = single_proof(&detached, ProofKind::Inclusion)?;
        let proof = decode_inclusion_proof(encoded)?;
        let root = self.tree.verify_inclusion_proof(leaf, &proof)?;

        match detached.attach(&root)?.verify(verifier)? {
            Verdict::Verified => Ok(Some(root)),
            Verdict::Rejected(reason) => {
                warn!(
                    tree_size = proof.tree_size,
                    leaf_index = proof.leaf_index,
                    %reason,
                    "inclusion receipt rejected"
                );
                Ok(None)
            }
        }
    }

    /// Verify a receipt carrying one inclusion proof per leaf, in order.
    ///
    /// Every proof must recompute the same root before the single
    /// signature check runs.
    pub fn verify_multiple(
        &self,
        leaves: &[Digest],
        receipt: &[u8],
        verifier: &dyn Verifier,
    ) -> Result<bool, ReceiptError> {
        let detached = Receipt::<Detached>::from_bytes(receipt)?;
        detached.require_structure(STRUCTURE)?;
        let encoded = detached.header_extension().inclusion_proofs();
        if encoded.is_empty() {
            return Err(ReceiptError::MissingProof(ProofKind::Inclusion));
        }
        if encoded.len() != leaves.len() {
            return Err(ReceiptError::MalformedProof(format!(
                "receipt carries {} inclusion proofs for {} leaves",
                encoded.len(),
                leaves.len()
            )));
        }

        let proofs: Vec<InclusionProof> = encoded
            .iter()
            .map(|bytes| decode_inclusion_proof(bytes))
            .collect::<Result<_, MerkleError>>()?;
        let roots: Vec<Digest> = leaves
            .iter()
            .zip(&proofs)
            .map(|(leaf, proof)| self.tree.verify_inclusion_proof(leaf, proof))
            .collect::<Result<_, MerkleError>>()?;

        let root = roots[0];
        if roots.iter().any(|r| *r != root) {
            warn!(proofs = roots.len(), "inclusion proofs disagree on the root");
            return Ok(false);
        }

        match detached.attach(&root)?.verify(verifier)? {
            Verdict::Verified => Ok(true),
            Verdict::Rejected(reason) => {
                warn!(proofs = roots.len(), %reason, "multi-proof receipt rejected");
                Ok(false)
            }
        }
    }

    /// Verify a consistency receipt against a trusted `old_root`.
    pub fn verify_consistency_proof(
        &self,
        old_root: &Digest,
        receipt: &[u8],
        verifier: &dyn Verifier,
    ) -> Result<bool, ReceiptError> {
        Ok(self
            .verified_consistency_root(old_root, receipt, verifier)?
            .is_some())
    }

    /// As [`verify_consistency_proof()`](Self::verify_consistency_proof),
    /// but returns the verified new root.
    pub fn verified_consistency_root(
        &self,
        old_root: &Digest,
        receipt: &[u8],
        verifier: &dyn Verifier,
    ) -> Result<Option<Digest>, ReceiptError> {
        let detached = Receipt::<Detached>::from_bytes(receipt)?;
        detached.require_structure(STRUCTURE)?;
        let encoded = single_proof(&detached, ProofKind::Consistency)?;
        let proof = decode_consistency_proof(encoded)?;

        let new_root = match self.tree.verify_consistency_proof(old_root, &proof) {
            Ok(root) => root,
            Err(MerkleError::RootMismatch) => {
                warn!(
                    tree_size_1 = proof.tree_size_1,
                    tree_size_2 = proof.tree_size_2,
                    "consistency proof does not match the trusted old root"
                );
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match detached.attach(&new_root)?.verify(verifier)? {
            Verdict::Verified => Ok(Some(new_root)),
            Verdict::Rejected(reason) => {
                warn!(
                    tree_size_1 = proof.tree_size_1,
                    tree_size_2 = proof.tree_size_2,
                    %reason,
                    "consistency receipt rejected"
                );
                Ok(None)
            }
        }
    }

    fn issue(
        &self,
        signer: &dyn Signer,
        issuer: &Issuer,
        root: &Digest,
        ext: HeaderExtension,
    ) -> Result<Vec<u8>, ReceiptError> {
        let protected = issuer.protected_header(signer, STRUCTURE)?;
        Receipt::<Signed>::sign(signer, &protected, root)?
            .with_header_extension(ext)
            .detach()?
            .to_bytes()
    }
}

/// The one proof of `kind` a receipt must carry.
fn single_proof(receipt: &Receipt<Detached>, kind: ProofKind) -> Result<&[u8], ReceiptError> {
    match receipt.header_extension().proofs(kind) {
        [] => Err(ReceiptError::MissingProof(kind)),
        [only] => Ok(only.as_slice()),
        many => Err(ReceiptError::MalformedProof(format!(
            "expected exactly one {kind}, found {}",
            many.len()
        ))),
    }
}

/// Tree size recorded by an inclusion receipt. All proofs in a
/// multi-proof receipt must agree on it.
fn previous_tree_size(previous: &Receipt<Detached>) -> Result<u64, ReceiptError> {
    let encoded = previous.header_extension().inclusion_proofs();
    let mut sizes = encoded
        .iter()
        .map(|bytes| decode_inclusion_proof(bytes).map(|p| p.tree_size));
    let first = sizes
        .next()
        .ok_or(ReceiptError::MissingProof(ProofKind::Inclusion))??;
    for size in sizes {
        if size? != first {
            return Err(ReceiptError::MalformedProof(
                "inclusion proofs disagree on tree size".into(),
            ));
        }
    }
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scitt_core::FailureClass;
    use scitt_cose::{CoseSign1, Ed25519Signer, Ed25519Verifier};
    use scitt_crypto::SigningKey;

    fn signer() -> Ed25519Signer {
        Ed25519Signer::new(SigningKey::from_seed(&[11u8; 32]))
    }

    fn verifier(s: &Ed25519Signer) -> Ed25519Verifier {
        Ed25519Verifier::new(s.public_key())
    }

    fn issuer() -> Issuer {
        Issuer::new(Algorithm::EDDSA, b"log-1".to_vec())
    }

    fn leaves(n: usize) -> Vec<Digest> {
        let tree = HashTree::sha256();
        (0..n)
            .map(|i| tree.leaf(format!("statement {i}").as_bytes()))
            .collect()
    }

    #[test]
    fn test_sign_root_without_signer_is_raw_root() {
        let p = ReceiptProtocol::sha256();
        let l = leaves(5);
        let out = p.sign_root(&l, None, &issuer()).unwrap();
        assert_eq!(out, p.tree().root(&l).to_vec());
    }

    #[test]
    fn test_sign_root_with_signer_is_attached() {
        let p = ReceiptProtocol::sha256();
        let s = signer();
        let l = leaves(5);
        let out = p.sign_root(&l, Some(&s), &issuer()).unwrap();
        let env = CoseSign1::from_bytes(&out).unwrap();
        assert_eq!(env.payload.unwrap(), p.tree().root(&l).to_vec());
        assert!(verifier(&s).verify(&out).is_ok());
    }

    #[test]
    fn test_inclusion_receipt_is_detached_with_one_proof() {
        let p = ReceiptProtocol::sha256();
        let receipt = p
            .sign_inclusion_proof(&leaves(4), 2, &signer(), &issuer())
            .unwrap();
        let env = CoseSign1::from_bytes(&receipt).unwrap();
        assert!(env.is_detached());
        assert_eq!(env.unprotected.inclusion_proofs().len(), 1);
        let ph = env.protected_header().unwrap();
        assert_eq!(ph.kid.as_deref(), Some(&b"log-1"[..]));
        assert_eq!(ph.verifiable_data_structure, Some(1));
    }

    #[test]
    fn test_inclusion_verifies_for_every_index() {
        let p = ReceiptProtocol::sha256();
        let s = signer();
        let l = leaves(7);
        for i in 0..7 {
            let receipt = p.sign_inclusion_proof(&l, i, &s, &issuer()).unwrap();
            assert!(p
                .verify_inclusion_proof(&l[i as usize], &receipt, &verifier(&s))
                .unwrap());
        }
    }

    #[test]
    fn test_inclusion_wrong_leaf_is_false() {
        let p = ReceiptProtocol::sha256();
        let s = signer();
        let l = leaves(4);
        let receipt = p.sign_inclusion_proof(&l, 1, &s, &issuer()).unwrap();
        assert!(!p
            .verify_inclusion_proof(&l[2], &receipt, &verifier(&s))
            .unwrap());
    }

    #[test]
    fn test_inclusion_index_out_of_range_fails_before_signing() {
        let p = ReceiptProtocol::sha256();
        let err = p
            .sign_inclusion_proof(&leaves(3), 3, &signer(), &issuer())
            .unwrap_err();
        assert_eq!(
            err,
            ReceiptError::Merkle(MerkleError::IndexOutOfRange {
                index: 3,
                tree_size: 3
            })
        );
    }

    #[test]
    fn test_algorithm_mismatch_refused() {
        let p = ReceiptProtocol::sha256();
        let err = p
            .sign_inclusion_proof(
                &leaves(3),
                0,
                &signer(),
                &Issuer::new(Algorithm::ES256, b"k".to_vec()),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ReceiptError::Cose(CoseError::AlgorithmMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_inclusion_proof() {
        let p = ReceiptProtocol::sha256();
        let s = signer();
        let l = leaves(3);
        let receipt = p.sign_inclusion_proof(&l, 0, &s, &issuer()).unwrap();
        let stripped =
            scitt_cose::set_header_extension(&receipt, HeaderExtension::new()).unwrap();
        assert_eq!(
            p.verify_inclusion_proof(&l[0], &stripped, &verifier(&s))
                .unwrap_err(),
            ReceiptError::MissingProof(ProofKind::Inclusion)
        );
    }

    #[test]
    fn test_single_verify_refuses_multi_proof_receipt() {
        let p = ReceiptProtocol::sha256();
        let s = signer();
        let l = leaves(6);
        let receipt = p.sign_inclusion_proofs(&l, &[1, 4], &s, &issuer()).unwrap();
        assert!(matches!(
            p.verify_inclusion_proof(&l[1], &receipt, &verifier(&s)),
            Err(ReceiptError::MalformedProof(_))
        ));
    }

    #[test]
    fn test_verify_multiple() {
        let p = ReceiptProtocol::sha256();
        let s = signer();
        let l = leaves(9);
        let receipt = p.sign_inclusion_proofs(&l, &[0, 5, 8], &s, &issuer()).unwrap();
        assert!(p
            .verify_multiple(&[l[0], l[5], l[8]], &receipt, &verifier(&s))
            .unwrap());
        assert!(!p
            .verify_multiple(&[l[0], l[6], l[8]], &receipt, &verifier(&s))
            .unwrap());
    }

    #[test]
    fn test_verify_multiple_count_mismatch() {
        let p = ReceiptProtocol::sha256();
        let s = signer();
        let l = leaves(4);
        let receipt = p.sign_inclusion_proofs(&l, &[0, 1], &s, &issuer()).unwrap();
        assert!(matches!(
            p.verify_multiple(&[l[0]], &receipt, &verifier(&s)),
            Err(ReceiptError::MalformedProof(_))
        ));
    }

    #[test]
    fn test_merge_inclusion_proofs() {
        let p = ReceiptProtocol::sha256();
        let s = signer();
        let l = leaves(5);
        let a = p.sign_inclusion_proof(&l, 1, &s, &issuer()).unwrap();
        let b = p.sign_inclusion_proof(&l, 3, &s, &issuer()).unwrap();
        // Ed25519 is deterministic, so both receipts share one signature.
        let merged = p.merge_inclusion_proofs(&a, &b).unwrap();
        assert!(p
            .verify_multiple(&[l[1], l[3]], &merged, &verifier(&s))
            .unwrap());
    }

    #[test]
    fn test_merge_different_roots_refused() {
        let p = ReceiptProtocol::sha256();
        let s = signer();
        let a = p.sign_inclusion_proof(&leaves(5), 1, &s, &issuer()).unwrap();
        let b = p.sign_inclusion_proof(&leaves(6), 1, &s, &issuer()).unwrap();
        assert!(matches!(
            p.merge_inclusion_proofs(&a, &b),
            Err(ReceiptError::IncompatibleReceipts(_))
        ));
    }

    #[test]
    fn test_consistency_roundtrip() {
        let p = ReceiptProtocol::sha256();
        let s = signer();
        let mut l = leaves(3);
        let inclusion = p.sign_inclusion_proof(&l, 1, &s, &issuer()).unwrap();
        let old_root = p
            .verified_inclusion_root(&l[1], &inclusion, &verifier(&s))
            .unwrap()
            .unwrap();

        l.extend(leaves(8).into_iter().skip(3));
        let consistency = p
            .sign_consistency_proof(&l, &inclusion, &s, &issuer())
            .unwrap();
        let new_root = p
            .verified_consistency_root(&old_root, &consistency, &verifier(&s))
            .unwrap();
        assert_eq!(new_root, Some(p.tree().root(&l)));
    }

    #[test]
    fn test_consistency_wrong_old_root_is_false() {
        let p = ReceiptProtocol::sha256();
        let s = signer();
        let l = leaves(6);
        let inclusion = p.sign_inclusion_proof(&l[..3], 0, &s, &issuer()).unwrap();
        let consistency = p
            .sign_consistency_proof(&l, &inclusion, &s, &issuer())
            .unwrap();
        let wrong = p.tree().root(&l[..2]);
        assert!(!p
            .verify_consistency_proof(&wrong, &consistency, &verifier(&s))
            .unwrap());
    }

    #[test]
    fn test_consistency_from_same_size_tree() {
        let p = ReceiptProtocol::sha256();
        let s = signer();
        let l = leaves(4);
        let inclusion = p.sign_inclusion_proof(&l, 0, &s, &issuer()).unwrap();
        let consistency = p
            .sign_consistency_proof(&l, &inclusion, &s, &issuer())
            .unwrap();
        assert!(p
            .verify_consistency_proof(&p.tree().root(&l), &consistency, &verifier(&s))
            .unwrap());
    }

    #[test]
    fn test_consistency_from_larger_tree_is_invalid_range() {
        let p = ReceiptProtocol::sha256();
        let s = signer();
        let l = leaves(6);
        let inclusion = p.sign_inclusion_proof(&l, 0, &s, &issuer()).unwrap();
        assert!(matches!(
            p.sign_consistency_proof(&l[..4], &inclusion, &s, &issuer()),
            Err(ReceiptError::Merkle(MerkleError::InvalidRange { .. }))
        ));
    }

    #[test]
    fn test_consistency_requires_inclusion_in_previous() {
        let p = ReceiptProtocol::sha256();
        let s = signer();
        let l = leaves(3);
        let inclusion = p.sign_inclusion_proof(&l, 0, &s, &issuer()).unwrap();
        let consistency = p
            .sign_consistency_proof(&l, &inclusion, &s, &issuer())
            .unwrap();
        assert_eq!(
            p.sign_consistency_proof(&l, &consistency, &s, &issuer())
                .unwrap_err(),
            ReceiptError::MissingProof(ProofKind::Inclusion)
        );
    }

    #[test]
    fn test_attached_receipt_refused_before_verifier() {
        let p = ReceiptProtocol::sha256();
        let s = signer();
        let l = leaves(3);
        let receipt = p.sign_inclusion_proof(&l, 0, &s, &issuer()).unwrap();
        let forged = scitt_cose::attach_payload(&receipt, &[0u8; 32]).unwrap();
        let err = p
            .verify_inclusion_proof(&l[0], &forged, &verifier(&s))
            .unwrap_err();
        assert_eq!(err, ReceiptError::Cose(CoseError::PayloadNotDetached));
        assert_eq!(err.class(), FailureClass::Unprocessable);
    }

    #[test]
    fn test_wrong_verifier_key_is_false() {
        let p = ReceiptProtocol::sha256();
        let l = leaves(3);
        let receipt = p.sign_inclusion_proof(&l, 0, &signer(), &issuer()).unwrap();
        let other = Ed25519Signer::new(SigningKey::from_seed(&[12u8; 32]));
        assert!(!p
            .verify_inclusion_proof(&l[0], &receipt, &verifier(&other))
            .unwrap());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(24))]

            #[test]
            fn receipt_verifies_only_for_its_leaf(
                n in 1usize..24,
                a in any::<u64>(),
                b in any::<u64>(),
            ) {
                let p = ReceiptProtocol::sha256();
                let s = signer();
                let l = leaves(n);
                let i = (a % n as u64) as usize;
                let j = (b % n as u64) as usize;
                let receipt = p.sign_inclusion_proof(&l, i as u64, &s, &issuer()).unwrap();
                let verified = p.verify_inclusion_proof(&l[j], &receipt, &verifier(&s)).unwrap();
                prop_assert_eq!(verified, i == j);
            }
        }
    }
}
