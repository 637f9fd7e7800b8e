//! # COSE_Sign1
//!
//! ```text
//! COSE_Sign1 = #6.18([ protected : bstr, unprotected : map,
//!                      payload : bstr / nil, signature : bstr ])
//! ```
//!
//! The protected header is kept as the exact byte string that was signed;
//! [`ProtectedHeader`] is a decoded view used to read `alg`, `kid`, and the
//! verifiable data structure. Re-encoding a decoded envelope reproduces the
//! protected bytes unchanged, so signatures stay valid across
//! attach/detach/header edits.

use ciborium::value::Value;

use scitt_core::{Algorithm, CoseError, HeaderLabel, VerifiableDataStructure};

use crate::cbor;
use crate::header::HeaderExtension;

/// CBOR tag for COSE_Sign1.
pub const COSE_SIGN1_TAG: u64 = 18;

// ---------------------------------------------------------------------------
// Protected header
// ---------------------------------------------------------------------------

/// Decoded protected header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProtectedHeader {
    pub alg: Option<Algorithm>,
    pub kid: Option<Vec<u8>>,
    /// Raw label-395 value, kept as an integer so unsupported values can be
    /// reported as they appear.
    pub verifiable_data_structure: Option<i64>,
    /// Other protected parameters, in original order.
    pub other: Vec<(Value, Value)>,
}

impl ProtectedHeader {
    pub fn new(alg: Algorithm) -> Self {
        Self {
            alg: Some(alg),
            ..Self::default()
        }
    }

    pub fn with_kid(mut self, kid: impl Into<Vec<u8>>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    pub fn with_structure(mut self, vds: VerifiableDataStructure) -> Self {
        self.verifiable_data_structure = Some(vds.as_i64());
        self
    }

    /// Encode as the `protected` byte string. An empty header encodes as a
    /// zero-length byte string.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CoseError> {
        let mut entries = Vec::new();
        if let Some(alg) = self.alg {
            entries.push((cbor::int(HeaderLabel::Alg.as_i64()), cbor::int(alg.as_i64())));
        }
        if let Some(kid) = &self.kid {
            entries.push((cbor::int(HeaderLabel::Kid.as_i64()), Value::Bytes(kid.clone())));
        }
        if let Some(vds) = self.verifiable_data_structure {
            entries.push((
                cbor::int(HeaderLabel::VerifiableDataStructure.as_i64()),
                cbor::int(vds),
            ));
        }
        entries.extend(self.other.iter().cloned());
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        cbor::to_vec(&Value::Map(entries))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoseError> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        let value = cbor::from_slice(bytes)?;
        let map = value
            .as_map()
            .ok_or_else(|| CoseError::MalformedHeader("protected header must be a map".into()))?;

        let mut header = Self::default();
        let mut seen: Vec<&Value> = Vec::with_capacity(map.len());
        for (label, entry) in map {
            if seen.contains(&label) {
                return Err(CoseError::MalformedHeader(format!(
                    "duplicate protected label {label:?}"
                )));
            }
            seen.push(label);
            match cbor::as_i64(label).and_then(HeaderLabel::from_i64) {
                Some(HeaderLabel::Alg) => {
                    let alg = cbor::as_i64(entry).ok_or_else(|| {
                        CoseError::MalformedHeader("alg must be an integer".into())
                    })?;
                    header.alg = Some(Algorithm(alg));
                }
                Some(HeaderLabel::Kid) => {
                    let kid = entry.as_bytes().ok_or_else(|| {
                        CoseError::MalformedHeader("kid must be a byte string".into())
                    })?;
                    header.kid = Some(kid.clone());
                }
                Some(HeaderLabel::VerifiableDataStructure) => {
                    let vds = cbor::as_i64(entry).ok_or_else(|| {
                        CoseError::MalformedHeader(
                            "verifiable data structure must be an integer".into(),
                        )
                    })?;
                    header.verifiable_data_structure = Some(vds);
                }
                _ => header.other.push((label.clone(), entry.clone())),
            }
        }
        Ok(header)
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A decoded COSE_Sign1 envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct CoseSign1 {
    /// Serialized protected header, exactly as signed.
    pub protected: Vec<u8>,
    pub unprotected: HeaderExtension,
    /// `None` when the payload is detached.
    pub payload: Option<Vec<u8>>,
    pub signature: Vec<u8>,
}

impl CoseSign1 {
    /// Decode an envelope. Untagged input is accepted; output is always
    /// tagged.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoseError> {
        let value = cbor::from_slice(bytes)?;
        let inner = match value {
            Value::Tag(COSE_SIGN1_TAG, inner) => *inner,
            Value::Tag(other, _) => {
                return Err(CoseError::NotSign1(format!("unexpected tag {other}")))
            }
            untagged => untagged,
        };
        let items = match inner {
            Value::Array(items) if items.len() == 4 => items,
            Value::Array(items) => {
                return Err(CoseError::NotSign1(format!(
                    "expected 4 elements, got {}",
                    items.len()
                )))
            }
            _ => return Err(CoseError::NotSign1("expected an array".into())),
        };
        let [protected, unprotected, payload, signature]: [Value; 4] = items
            .try_into()
            .map_err(|_| CoseError::NotSign1("expected 4 elements".into()))?;

        let protected = protected
            .into_bytes()
            .map_err(|_| CoseError::NotSign1("protected header must be a byte string".into()))?;
        // Validate the protected header eagerly so a malformed one is
        // reported at decode time.
        ProtectedHeader::from_bytes(&protected)?;

        let unprotected = HeaderExtension::from_value(&unprotected)?;

        let payload = match payload {
            Value::Null => None,
            Value::Bytes(b) => Some(b),
            _ => {
                return Err(CoseError::NotSign1(
                    "payload must be a byte string or nil".into(),
                ))
            }
        };

        let signature = signature
            .into_bytes()
            .map_err(|_| CoseError::NotSign1("signature must be a byte string".into()))?;

        Ok(Self {
            protected,
            unprotected,
            payload,
            signature,
        })
    }

    /// Encode as a tagged COSE_Sign1.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CoseError> {
        let payload = match &self.payload {
            Some(p) => Value::Bytes(p.clone()),
            None => Value::Null,
        };
        let value = Value::Tag(
            COSE_SIGN1_TAG,
            Box::new(Value::Array(vec![
                Value::Bytes(self.protected.clone()),
                self.unprotected.to_value(),
                payload,
                Value::Bytes(self.signature.clone()),
            ])),
        );
        cbor::to_vec(&value)
    }

    /// Decoded view of the protected header.
    pub fn protected_header(&self) -> Result<ProtectedHeader, CoseError> {
        ProtectedHeader::from_bytes(&self.protected)
    }

    pub fn is_detached(&self) -> bool {
        self.payload.is_none()
    }

    /// Put `payload` into an empty payload slot.
    pub fn attach(mut self, payload: &[u8]) -> Result<Self, CoseError> {
        if self.payload.is_some() {
            return Err(CoseError::PayloadNotDetached);
        }
        self.payload = Some(payload.to_vec());
        Ok(self)
    }

    /// Take the payload out, leaving the slot nil.
    pub fn detach(mut self) -> Result<(Vec<u8>, Self), CoseError> {
        let payload = self.payload.take().ok_or(CoseError::PayloadDetached)?;
        Ok((payload, self))
    }

    pub fn header_extension(&self) -> &HeaderExtension {
        &self.unprotected
    }

    /// Replace the unprotected header wholesale.
    pub fn with_header_extension(mut self, ext: HeaderExtension) -> Self {
        self.unprotected = ext;
        self
    }

    /// The RFC 9052 `Sig_structure` for this envelope with an empty
    /// external AAD. Fails if the payload is detached.
    pub fn to_be_signed(&self) -> Result<Vec<u8>, CoseError> {
        let payload = self.payload.as_deref().ok_or(CoseError::PayloadDetached)?;
        sig_structure(&self.protected, payload)
    }
}

/// `Sig_structure = ["Signature1", body_protected, external_aad, payload]`
/// with `external_aad = h''`.
pub fn sig_structure(protected: &[u8], payload: &[u8]) -> Result<Vec<u8>, CoseError> {
    cbor::to_vec(&Value::Array(vec![
        Value::Text("Signature1".into()),
        Value::Bytes(protected.to_vec()),
        Value::Bytes(Vec::new()),
        Value::Bytes(payload.to_vec()),
    ]))
}
