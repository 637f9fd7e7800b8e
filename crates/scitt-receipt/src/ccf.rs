//! Receipts for the `CCF_LEDGER_SHA256` verifiable data structure.
//!
//! A CCF receipt carries one or more ledger inclusion proofs under the
//! 396 / -1 header entry. Each proof folds to the ledger root; the
//! signature covers that root.

use tracing::{debug, warn};

use scitt_core::{Digest, MerkleError, ProofKind, ReceiptError, VerifiableDataStructure};
use scitt_cose::proof::{decode_ccf_proof, encode_ccf_proof};
use scitt_cose::{HeaderExtension, Signer, Verifier};
use scitt_crypto::ccf::{CcfInclusionProof, LedgerProfile};
use scitt_crypto::{HashFunction, Sha256Hash};

use crate::lifecycle::{Detached, Receipt, Signed, Verdict};
use crate::protocol::Issuer;

const STRUCTURE: VerifiableDataStructure = VerifiableDataStructure::CcfLedgerSha256;

/// Issue and verify CCF ledger receipts.
#[derive(Debug, Clone, Default)]
pub struct LedgerReceipts<H = Sha256Hash> {
    profile: LedgerProfile<H>,
}

impl LedgerReceipts<Sha256Hash> {
    pub fn sha256() -> Self {
        Self {
            profile: LedgerProfile::sha256(),
        }
    }
}

impl<H: HashFunction> LedgerReceipts<H> {
    pub fn new(profile: LedgerProfile<H>) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &LedgerProfile<H> {
        &self.profile
    }

    /// Sign the common root of `proofs` and carry every proof in the
    /// receipt. All proofs must fold to the same root.
    pub fn issue_receipt(
        &self,
        proofs: &[CcfInclusionProof],
        signer: &dyn Signer,
        issuer: &Issuer,
    ) -> Result<Vec<u8>, ReceiptError> {
        let (first, rest) = proofs
            .split_first()
            .ok_or(ReceiptError::MissingProof(ProofKind::Inclusion))?;
        let root = self.profile.compute_root(first)?;
        let mut ext =
            HeaderExtension::new().with_proof(ProofKind::Inclusion, encode_ccf_proof(first)?);
        for proof in rest {
            if self.profile.compute_root(proof)? != root {
                return Err(ReceiptError::MalformedProof(
                    "ledger proofs fold to different roots".into(),
                ));
            }
            ext.push_proof(ProofKind::Inclusion, encode_ccf_proof(proof)?);
        }

        let protected = issuer.protected_header(signer, STRUCTURE)?;
        let receipt = Receipt::<Signed>::sign(signer, &protected, &root)?
            .with_header_extension(ext)
            .detach()?
            .to_bytes()?;
        debug!(proofs = proofs.len(), root = %root, "issued ledger receipt");
        Ok(receipt)
    }

    /// Verify a ledger receipt.
    ///
    /// The protected header must name `CCF_LEDGER_SHA256`; an absent
    /// structure label is reported as `actual: 0`. When
    /// `expected_data_hash` is given, every carried leaf must commit to it;
    /// a leaf that commits to something else makes the receipt `false`.
    pub fn verify_receipt(
        &self,
        receipt: &[u8],
        verifier: &dyn Verifier,
        expected_data_hash: Option<&Digest>,
    ) -> Result<bool, ReceiptError> {
        let detached = Receipt::<Detached>::from_bytes(receipt)?;
        let protected = detached.protected_header()?;
        match protected.verifiable_data_structure {
            Some(v) if v == STRUCTURE.as_i64() => {}
            other => {
                return Err(ReceiptError::UnsupportedStructure {
                    expected: STRUCTURE,
                    actual: other.unwrap_or(0),
                })
            }
        }

        let encoded = detached.header_extension().inclusion_proofs();
        if encoded.is_empty() {
            return Err(ReceiptError::MissingProof(ProofKind::Inclusion));
        }
        let proofs: Vec<CcfInclusionProof> = encoded
            .iter()
            .map(|bytes| decode_ccf_proof(bytes))
            .collect::<Result<_, MerkleError>>()?;

        if let Some(expected) = expected_data_hash {
            if proofs.iter().any(|p| p.leaf.data_hash != *expected) {
                warn!(expected = %expected, "ledger leaf commits to a different data hash");
                return Ok(false);
            }
        }

        let roots: Vec<Digest> = proofs
            .iter()
            .map(|p| self.profile.compute_root(p))
            .collect::<Result<_, MerkleError>>()?;
        let root = roots[0];
        if roots.iter().any(|r| *r != root) {
            warn!(proofs = roots.len(), "ledger proofs disagree on the root");
            return Ok(false);
        }

        match detached.attach(&root)?.verify(verifier)? {
            Verdict::Verified => Ok(true),
            Verdict::Rejected(reason) => {
                warn!(%reason, "ledger receipt rejected");
                Ok(false)
            }
        }
    }
}
