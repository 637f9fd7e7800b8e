//! # Header Extension
//!
//! Typed view of a COSE_Sign1 unprotected header as used by receipts:
//!
//! - **396** `verifiable-data-proofs`: map of proof kind to a list of
//!   serialized proofs (`-1` inclusion, `-2` consistency).
//! - **394** `receipts`: list of whole COSE_Sign1 receipts accumulated on a
//!   signed statement.
//! - anything else is kept verbatim, in its original order.
//!
//! Absence of a label means zero entries of that kind. Empty lists are not
//! written back out.

use std::collections::BTreeMap;

use ciborium::value::Value;

use scitt_core::{CoseError, HeaderLabel, ProofKind};

use crate::cbor;

/// The unprotected header of a receipt or signed statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderExtension {
    proofs: BTreeMap<ProofKind, Vec<Vec<u8>>>,
    receipts: Vec<Vec<u8>>,
    unknown: Vec<(Value, Value)>,
}

impl HeaderExtension {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the header would encode as an empty map.
    pub fn is_empty(&self) -> bool {
        self.proofs.values().all(Vec::is_empty)
            && self.receipts.is_empty()
            && self.unknown.is_empty()
    }

    /// Serialized proofs of `kind`, in header order.
    pub fn proofs(&self, kind: ProofKind) -> &[Vec<u8>] {
        self.proofs.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn inclusion_proofs(&self) -> &[Vec<u8>] {
        self.proofs(ProofKind::Inclusion)
    }

    pub fn consistency_proofs(&self) -> &[Vec<u8>] {
        self.proofs(ProofKind::Consistency)
    }

    /// Replace every proof of `kind`.
    pub fn set_proofs(&mut self, kind: ProofKind, proofs: Vec<Vec<u8>>) {
        if proofs.is_empty() {
            self.proofs.remove(&kind);
        } else {
            self.proofs.insert(kind, proofs);
        }
    }

    pub fn push_proof(&mut self, kind: ProofKind, proof: Vec<u8>) {
        self.proofs.entry(kind).or_default().push(proof);
    }

    /// Builder form of [`push_proof()`](Self::push_proof).
    pub fn with_proof(mut self, kind: ProofKind, proof: Vec<u8>) -> Self {
        self.push_proof(kind, proof);
        self
    }

    /// Proof kinds present, in label order.
    pub fn proof_kinds(&self) -> impl Iterator<Item = ProofKind> + '_ {
        self.proofs
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| *k)
    }

    pub fn receipts(&self) -> &[Vec<u8>] {
        &self.receipts
    }

    pub fn push_receipt(&mut self, receipt: Vec<u8>) {
        self.receipts.push(receipt);
    }

    pub fn set_receipts(&mut self, receipts: Vec<Vec<u8>>) {
        self.receipts = receipts;
    }

    /// Entries under labels this type does not model.
    pub fn unknown(&self) -> &[(Value, Value)] {
        &self.unknown
    }

    /// Add an entry under an unmodelled label.
    ///
    /// Fails if the label is one of the modelled ones or is already present.
    pub fn insert_unknown(&mut self, label: Value, value: Value) -> Result<(), CoseError> {
        if let Some(known) = cbor::as_i64(&label).and_then(HeaderLabel::from_i64) {
            if matches!(
                known,
                HeaderLabel::Receipts | HeaderLabel::VerifiableDataProofs
            ) {
                return Err(CoseError::MalformedHeader(format!(
                    "label {} is modelled; use the typed accessors",
                    known.as_i64()
                )));
            }
        }
        if self.unknown.iter().any(|(l, _)| *l == label) {
            return Err(CoseError::MalformedHeader(format!(
                "duplicate header label {label:?}"
            )));
        }
        self.unknown.push((label, value));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // CBOR
    // -----------------------------------------------------------------------

    /// Encode as a CBOR map. Modelled labels come first, in ascending order.
    pub fn to_value(&self) -> Value {
        let mut entries = Vec::new();

        if !self.receipts.is_empty() {
            entries.push((
                cbor::int(HeaderLabel::Receipts.as_i64()),
                Value::Array(self.receipts.iter().cloned().map(Value::Bytes).collect()),
            ));
        }

        let proofs: Vec<(Value, Value)> = self
            .proofs
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(kind, list)| {
                (
                    cbor::int(kind.as_i64()),
                    Value::Array(list.iter().cloned().map(Value::Bytes).collect()),
                )
            })
            .collect();
        if !proofs.is_empty() {
            entries.push((
                cbor::int(HeaderLabel::VerifiableDataProofs.as_i64()),
                Value::Map(proofs),
            ));
        }

        entries.extend(self.unknown.iter().cloned());
        Value::Map(entries)
    }

    /// Decode from a CBOR map.
    pub fn from_value(value: &Value) -> Result<Self, CoseError> {
        let map = value
            .as_map()
            .ok_or_else(|| CoseError::MalformedHeader("unprotected header must be a map".into()))?;

        let mut ext = Self::default();
        let mut seen_receipts = false;
        let mut seen_proofs = false;

        for (label, entry) in map {
            match cbor::as_i64(label).and_then(HeaderLabel::from_i64) {
                Some(HeaderLabel::Receipts) => {
                    if std::mem::replace(&mut seen_receipts, true) {
                        return Err(duplicate(HeaderLabel::Receipts));
                    }
                    ext.receipts = byte_list(entry, "receipts")?;
                }
                Some(HeaderLabel::VerifiableDataProofs) => {
                    if std::mem::replace(&mut seen_proofs, true) {
                        return Err(duplicate(HeaderLabel::VerifiableDataProofs));
                    }
                    let inner = entry.as_map().ok_or_else(|| {
                        CoseError::MalformedHeader("verifiable data proofs must be a map".into())
                    })?;
                    for (k, list) in inner {
                        let kind = cbor::as_i64(k).map(ProofKind::from_i64).ok_or_else(|| {
                            CoseError::MalformedHeader("proof kind must be an integer".into())
                        })?;
                        if ext.proofs.contains_key(&kind) {
                            return Err(CoseError::MalformedHeader(format!(
                                "duplicate proof kind {}",
                                kind.as_i64()
                            )));
                        }
                        ext.proofs.insert(kind, byte_list(list, kind.as_str())?);
                    }
                }
                _ => ext.insert_unknown(label.clone(), entry.clone())?,
            }
        }
        Ok(ext)
    }
}

fn duplicate(label: HeaderLabel) -> CoseError {
    CoseError::MalformedHeader(format!("duplicate header label {}", label.as_i64()))
}

fn byte_list(value: &Value, what: &str) -> Result<Vec<Vec<u8>>, CoseError> {
    let items = value
        .as_array()
        .ok_or_else(|| CoseError::MalformedHeader(format!("{what} must be an array")))?;
    items
        .iter()
        .map(|item| {
            item.as_bytes()
                .cloned()
                .ok_or_else(|| {
                    CoseError::MalformedHeader(format!("{what} entries must be byte strings"))
                })
        })
        .collect()
}
