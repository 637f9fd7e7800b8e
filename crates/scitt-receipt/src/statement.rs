//! Receipts accumulated on a signed statement.
//!
//! Receipts live in the statement's unprotected header under label 394.
//! None of these functions touch the statement's protected header,
//! payload, or signature, so the statement's own signature still verifies
//! after receipts are added or removed.

use tracing::debug;

use scitt_core::ReceiptError;
use scitt_cose::{CoseSign1, HeaderExtension};

/// Append `receipt` to the statement's receipts, keeping any already
/// present. The receipt must decode as a COSE_Sign1.
pub fn add_receipt(statement: &[u8], receipt: &[u8]) -> Result<Vec<u8>, ReceiptError> {
    CoseSign1::from_bytes(receipt)?;
    let envelope = CoseSign1::from_bytes(statement)?;
    let mut ext = envelope.header_extension().clone();
    ext.push_receipt(receipt.to_vec());
    let count = ext.receipts().len();
    let out = envelope.with_header_extension(ext).to_bytes()?;
    debug!(receipts = count, "added receipt to statement");
    Ok(out)
}

/// Receipts carried by the statement, in the order they were added.
pub fn receipts(statement: &[u8]) -> Result<Vec<Vec<u8>>, ReceiptError> {
    Ok(CoseSign1::from_bytes(statement)?
        .header_extension()
        .receipts()
        .to_vec())
}

/// Clear the statement's unprotected header, dropping every receipt and
/// any other unprotected entry.
pub fn remove_receipts(statement: &[u8]) -> Result<Vec<u8>, ReceiptError> {
    Ok(CoseSign1::from_bytes(statement)?
        .with_header_extension(HeaderExtension::new())
        .to_bytes()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scitt_core::{Algorithm, CoseError, Digest};
    use scitt_cose::{Ed25519Signer, Ed25519Verifier, ProtectedHeader, Signer, Verifier};
    use scitt_crypto::SigningKey;

    use crate::protocol::{Issuer, ReceiptProtocol};

    fn statement(s: &Ed25519Signer) -> Vec<u8> {
        s.sign(&ProtectedHeader::new(Algorithm::EDDSA), b"hello statement")
            .unwrap()
    }

    fn receipt(s: &Ed25519Signer, n: usize) -> Vec<u8> {
        let p = ReceiptProtocol::sha256();
        let leaves: Vec<Digest> = (0..n).map(|i| p.tree().leaf(&[i as u8])).collect();
        p.sign_inclusion_proof(&leaves, 0, s, &Issuer::new(Algorithm::EDDSA, b"log".to_vec()))
            .unwrap()
    }

    #[test]
    fn test_add_preserves_existing_receipts() {
        let s = Ed25519Signer::new(SigningKey::from_seed(&[3u8; 32]));
        let first = receipt(&s, 2);
        let second = receipt(&s, 3);
        let stmt = add_receipt(&statement(&s), &first).unwrap();
        let stmt = add_receipt(&stmt, &second).unwrap();
        assert_eq!(receipts(&stmt).unwrap(), vec![first, second]);
    }

    #[test]
    fn test_statement_signature_survives() {
        let s = Ed25519Signer::new(SigningKey::from_seed(&[3u8; 32]));
        let stmt = add_receipt(&statement(&s), &receipt(&s, 2)).unwrap();
        let v = Ed25519Verifier::new(s.public_key());
        assert!(v.verify(&stmt).is_ok());
        assert!(v.verify(&remove_receipts(&stmt).unwrap()).is_ok());
    }

    #[test]
    fn test_remove_receipts() {
        let s = Ed25519Signer::new(SigningKey::from_seed(&[3u8; 32]));
        let stmt = add_receipt(&statement(&s), &receipt(&s, 2)).unwrap();
        let stripped = remove_receipts(&stmt).unwrap();
        assert!(receipts(&stripped).unwrap().is_empty());
        assert!(CoseSign1::from_bytes(&stripped)
            .unwrap()
            .header_extension()
            .is_empty());
    }

    #[test]
    fn test_receipt_verifies_against_stripped_statement_leaf() {
        let s = Ed25519Signer::new(SigningKey::from_seed(&[3u8; 32]));
        let v = Ed25519Verifier::new(s.public_key());
        let p = ReceiptProtocol::sha256();
        let issuer = Issuer::new(Algorithm::EDDSA, b"log".to_vec());
        let stmt = statement(&s);

        let mut log: Vec<Digest> = (0..4u8).map(|i| p.tree().leaf(&[i])).collect();
        log.push(p.tree().leaf(&remove_receipts(&stmt).unwrap()));
        let registered = p.sign_inclusion_proof(&log, 4, &s, &issuer).unwrap();
        let unrelated = p.sign_inclusion_proof(&log, 1, &s, &issuer).unwrap();

        assert!(p.verify_statement_receipts(&stmt, &v).unwrap().is_empty());
        let stmt = add_receipt(&stmt, &registered).unwrap();
        let stmt = add_receipt(&stmt, &unrelated).unwrap();
        assert_eq!(p.statement_leaf(&stmt).unwrap(), log[4]);
        assert_eq!(p.verify_statement_receipts(&stmt, &v).unwrap(), vec![true, false]);
    }

    #[test]
    fn test_add_refuses_garbage_receipt() {
        let s = Ed25519Signer::new(SigningKey::from_seed(&[3u8; 32]));
        assert!(matches!(
            add_receipt(&statement(&s), b"not cbor"),
            Err(ReceiptError::Cose(CoseError::Decode(_)))
        ));
    }
}
