//! # Proof Codec
//!
//! CBOR encodings for the proofs carried under label 396:
//!
//! ```text
//! rfc9162 inclusion   = [ tree_size: uint, leaf_index: uint, [ + bstr .size 32 ] ]
//! rfc9162 consistency = [ tree_size_1: uint, tree_size_2: uint, [ * bstr .size 32 ] ]
//! ccf inclusion       = { 1: [ bstr .size 32, tstr, bstr .size 32 ],
//!                         2: [ * [ bool, bstr .size 32 ] ] }
//! ```
//!
//! Decoding is strict: wrong arity, wrong types, or sibling hashes of the
//! wrong length are `MalformedProof`. CCF leaves are additionally validated
//! (`InvalidLeaf`) before anything downstream can hash them.

use ciborium::value::Value;

use scitt_core::{CoseError, Digest, MerkleError};
use scitt_crypto::ccf::{CcfInclusionProof, CcfLeaf, CcfPathStep};
use scitt_crypto::merkle::{ConsistencyProof, InclusionProof, MAX_PATH_LEN};

use crate::cbor;

const CCF_LEAF_LABEL: i64 = 1;
const CCF_PATH_LABEL: i64 = 2;

fn malformed(msg: impl Into<String>) -> MerkleError {
    MerkleError::MalformedProof(msg.into())
}

fn digest_list(path: &[Digest]) -> Value {
    Value::Array(path.iter().map(|d| Value::Bytes(d.to_vec())).collect())
}

fn decode_digest(value: &Value, what: &str) -> Result<Digest, MerkleError> {
    let bytes = value
        .as_bytes()
        .ok_or_else(|| malformed(format!("{what} must be a byte string")))?;
    Digest::from_slice(bytes)
        .ok_or_else(|| malformed(format!("{what} must be 32 bytes, got {}", bytes.len())))
}

fn decode_digest_list(value: &Value, what: &str) -> Result<Vec<Digest>, MerkleError> {
    let items = value
        .as_array()
        .ok_or_else(|| malformed(format!("{what} must be an array")))?;
    if items.len() > MAX_PATH_LEN {
        return Err(malformed(format!(
            "{what} has {} entries, limit is {MAX_PATH_LEN}",
            items.len()
        )));
    }
    items.iter().map(|v| decode_digest(v, what)).collect()
}

/// Decode a 3-element array of `[uint, uint, path]`.
fn decode_triple(bytes: &[u8], what: &str) -> Result<(u64, u64, Vec<Digest>), MerkleError> {
    let value = cbor::from_slice(bytes).map_err(|e| malformed(format!("{what}: {e}")))?;
    let items = value
        .as_array()
        .filter(|items| items.len() == 3)
        .ok_or_else(|| malformed(format!("{what} must be a 3-element array")))?;
    let a = cbor::as_u64(&items[0])
        .ok_or_else(|| malformed(format!("{what}: first size must be an unsigned integer")))?;
    let b = cbor::as_u64(&items[1])
        .ok_or_else(|| malformed(format!("{what}: second field must be an unsigned integer")))?;
    let path = decode_digest_list(&items[2], what)?;
    Ok((a, b, path))
}

// ---------------------------------------------------------------------------
// RFC 9162
// ---------------------------------------------------------------------------

pub fn encode_inclusion_proof(proof: &InclusionProof) -> Result<Vec<u8>, CoseError> {
    cbor::to_vec(&Value::Array(vec![
        cbor::uint(proof.tree_size),
        cbor::uint(proof.leaf_index),
        digest_list(&proof.audit_path),
    ]))
}

pub fn decode_inclusion_proof(bytes: &[u8]) -> Result<InclusionProof, MerkleError> {
    let (tree_size, leaf_index, audit_path) = decode_triple(bytes, "inclusion proof")?;
    Ok(InclusionProof {
        tree_size,
        leaf_index,
        audit_path,
    })
}

pub fn encode_consistency_proof(proof: &ConsistencyProof) -> Result<Vec<u8>, CoseError> {
    cbor::to_vec(&Value::Array(vec![
        cbor::uint(proof.tree_size_1),
        cbor::uint(proof.tree_size_2),
        digest_list(&proof.consistency_path),
    ]))
}

pub fn decode_consistency_proof(bytes: &[u8]) -> Result<ConsistencyProof, MerkleError> {
    let (tree_size_1, tree_size_2, consistency_path) =
        decode_triple(bytes, "consistency proof")?;
    Ok(ConsistencyProof {
        tree_size_1,
        tree_size_2,
        consistency_path,
    })
}

// ---------------------------------------------------------------------------
// CCF
// ---------------------------------------------------------------------------

pub fn encode_ccf_proof(proof: &CcfInclusionProof) -> Result<Vec<u8>, CoseError> {
    let leaf = Value::Array(vec![
        Value::Bytes(proof.leaf.internal_transaction_hash.to_vec()),
        Value::Text(proof.leaf.internal_evidence.clone()),
        Value::Bytes(proof.leaf.data_hash.to_vec()),
    ]);
    let path = Value::Array(
        proof
            .path
            .iter()
            .map(|step| {
                Value::Array(vec![
                    Value::Bool(step.left),
                    Value::Bytes(step.hash.to_vec()),
                ])
            })
            .collect(),
    );
    cbor::to_vec(&Value::Map(vec![
        (cbor::int(CCF_LEAF_LABEL), leaf),
        (cbor::int(CCF_PATH_LABEL), path),
    ]))
}

pub fn decode_ccf_proof(bytes: &[u8]) -> Result<CcfInclusionProof, MerkleError> {
    let value = cbor::from_slice(bytes).map_err(|e| malformed(format!("ccf proof: {e}")))?;
    let map = value
        .as_map()
        .ok_or_else(|| malformed("ccf proof must be a map"))?;

    let lookup = |label: i64| {
        map.iter()
            .find(|(k, _)| cbor::as_i64(k) == Some(label))
            .map(|(_, v)| v)
    };

    let leaf = lookup(CCF_LEAF_LABEL)
        .and_then(Value::as_array)
        .filter(|items| items.len() == 3)
        .ok_or_else(|| malformed("ccf leaf must be present and have 3 elements"))?;
    let itx = leaf[0]
        .as_bytes()
        .ok_or_else(|| malformed("internal_transaction_hash must be a byte string"))?;
    let evidence = leaf[1]
        .as_text()
        .ok_or_else(|| malformed("internal_evidence must be a text string"))?;
    let data_hash = leaf[2]
        .as_bytes()
        .ok_or_else(|| malformed("data_hash must be a byte string"))?;
    let leaf = CcfLeaf::new(itx, evidence, data_hash)?;

    let steps = lookup(CCF_PATH_LABEL)
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("ccf path must be present"))?;
    if steps.len() > MAX_PATH_LEN {
        return Err(malformed(format!(
            "ccf path has {} steps, limit is {MAX_PATH_LEN}",
            steps.len()
        )));
    }
    let path = steps
        .iter()
        .map(|step| {
            let pair = step
                .as_array()
                .filter(|p| p.len() == 2)
                .ok_or_else(|| malformed("ccf path element must be [bool, bstr]"))?;
            let left = pair[0]
                .as_bool()
                .ok_or_else(|| malformed("ccf path direction must be a bool"))?;
            let hash = decode_digest(&pair[1], "ccf path hash")?;
            Ok(CcfPathStep { left, hash })
        })
        .collect::<Result<Vec<_>, MerkleError>>()?;

    Ok(CcfInclusionProof { leaf, path })
}
