//! # Envelope Binding
//!
//! Byte-level manipulation of already-signed envelopes. A receipt is
//! produced by signing the tree root as an attached payload, detaching it,
//! and storing the proof in the unprotected header; verification reattaches
//! the root recomputed from that proof.
//!
//! None of these operations touch the protected header or the signature,
//! and none of them verify anything.

use scitt_core::CoseError;

use crate::header::HeaderExtension;
use crate::sign1::CoseSign1;

/// Insert `payload` into a signature-only envelope.
///
/// Fails with `PayloadNotDetached` when the payload slot is not nil, so a
/// receipt carrying a forged payload never reaches signature verification.
pub fn attach_payload(envelope: &[u8], payload: &[u8]) -> Result<Vec<u8>, CoseError> {
    CoseSign1::from_bytes(envelope)?.attach(payload)?.to_bytes()
}

/// Split an envelope into its payload and the signature-only envelope.
pub fn detach_payload(envelope: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CoseError> {
    let (payload, detached) = CoseSign1::from_bytes(envelope)?.detach()?;
    Ok((payload, detached.to_bytes()?))
}

/// Read the unprotected header.
pub fn get_header_extension(envelope: &[u8]) -> Result<HeaderExtension, CoseError> {
    Ok(CoseSign1::from_bytes(envelope)?.unprotected)
}

/// Replace the unprotected header wholesale. This never merges; callers
/// that want to add to a header read it, modify it, and write it back.
pub fn set_header_extension(envelope: &[u8], ext: HeaderExtension) -> Result<Vec<u8>, CoseError> {
    CoseSign1::from_bytes(envelope)?
        .with_header_extension(ext)
        .to_bytes()
}
