//! # Receipt Subcommand
//!
//! Manages the receipts carried in a signed statement's unprotected
//! header. None of these commands invalidate the statement's signature.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use scitt_core::hex;
use scitt_cose::CoseSign1;
use scitt_receipt::{add_receipt, receipts, remove_receipts};

use crate::{read_bytes, write_bytes, EXIT_OK};

/// Arguments for `scitt receipt`.
#[derive(Args, Debug)]
pub struct ReceiptArgs {
    #[command(subcommand)]
    pub command: ReceiptCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReceiptCommand {
    /// Append a receipt to a statement.
    Add {
        /// Signed statement file.
        #[arg(long)]
        statement: PathBuf,
        /// Receipt file.
        #[arg(long)]
        receipt: PathBuf,
        /// Output statement file. Defaults to rewriting the input.
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// List the receipts on a statement.
    List {
        /// Signed statement file.
        #[arg(long)]
        statement: PathBuf,
        /// Emit the listing as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Remove every receipt (and all other unprotected entries).
    Strip {
        /// Signed statement file.
        #[arg(long)]
        statement: PathBuf,
        /// Output statement file. Defaults to rewriting the input.
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
}

/// One row of `scitt receipt list`.
#[derive(Debug, Serialize)]
pub struct ReceiptSummary {
    pub index: usize,
    pub size: usize,
    pub kid: Option<String>,
    pub verifiable_data_structure: Option<i64>,
}

impl ReceiptSummary {
    fn from_bytes(index: usize, bytes: &[u8]) -> Result<Self> {
        let header = CoseSign1::from_bytes(bytes)
            .and_then(|env| env.protected_header())
            .with_context(|| format!("receipt {index} is not a COSE_Sign1"))?;
        Ok(Self {
            index,
            size: bytes.len(),
            kid: header.kid.map(|k| match String::from_utf8(k) {
                Ok(text) => text,
                Err(e) => hex::encode(e.as_bytes()),
            }),
            verifiable_data_structure: header.verifiable_data_structure,
        })
    }
}

/// Execute the receipt subcommand.
pub fn run_receipt(args: &ReceiptArgs) -> Result<u8> {
    match &args.command {
        ReceiptCommand::Add {
            statement,
            receipt,
            out,
        } => {
            let updated = add_receipt(&read_bytes(statement)?, &read_bytes(receipt)?)
                .context("failed to add receipt")?;
            let out = out.as_ref().unwrap_or(statement);
            write_bytes(out, &updated)?;
            println!("OK: added receipt to {}", out.display());
            Ok(EXIT_OK)
        }

        ReceiptCommand::List { statement, json } => {
            let all = receipts(&read_bytes(statement)?)?;
            let summaries = all
                .iter()
                .enumerate()
                .map(|(i, r)| ReceiptSummary::from_bytes(i, r))
                .collect::<Result<Vec<_>>>()?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else if summaries.is_empty() {
                println!("no receipts");
            } else {
                for s in &summaries {
                    println!(
                        "{}: {} bytes, kid={}, vds={}",
                        s.index,
                        s.size,
                        s.kid.as_deref().unwrap_or("-"),
                        s.verifiable_data_structure
                            .map(|v| v.to_string())
                            .unwrap_or_else(|| "-".into())
                    );
                }
            }
            Ok(EXIT_OK)
        }

        ReceiptCommand::Strip { statement, out } => {
            let stripped = remove_receipts(&read_bytes(statement)?)?;
            let out = out.as_ref().unwrap_or(statement);
            write_bytes(out, &stripped)?;
            println!("OK: stripped receipts from {}", out.display());
            Ok(EXIT_OK)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scitt_core::{Algorithm, Digest};
    use scitt_cose::{Ed25519Signer, ProtectedHeader, Signer};
    use scitt_crypto::{HashTree, SigningKey};
    use scitt_receipt::{Issuer, ReceiptProtocol};

    #[test]
    fn add_list_strip() {
        let dir = tempfile::tempdir().unwrap();
        let signer = Ed25519Signer::new(SigningKey::from_seed(&[5u8; 32]));

        let statement = dir.path().join("statement.cbor");
        std::fs::write(
            &statement,
            signer
                .sign(&ProtectedHeader::new(Algorithm::EDDSA), b"claim")
                .unwrap(),
        )
        .unwrap();

        let tree = HashTree::sha256();
        let leaves: Vec<Digest> = vec![tree.leaf(b"claim"), tree.leaf(b"other")];
        let issuer = Issuer::new(Algorithm::EDDSA, b"log".to_vec());
        let receipt = ReceiptProtocol::sha256()
            .sign_inclusion_proof(&leaves, 0, &signer, &issuer)
            .unwrap();
        let receipt_path = dir.path().join("receipt.cbor");
        std::fs::write(&receipt_path, &receipt).unwrap();

        let add = ReceiptArgs {
            command: ReceiptCommand::Add {
                statement: statement.clone(),
                receipt: receipt_path,
                out: None,
            },
        };
        assert_eq!(run_receipt(&add).unwrap(), EXIT_OK);

        let on_disk = std::fs::read(&statement).unwrap();
        assert_eq!(receipts(&on_disk).unwrap(), vec![receipt.clone()]);
        let summary = ReceiptSummary::from_bytes(0, &receipt).unwrap();
        assert_eq!(summary.kid.as_deref(), Some("log"));
        assert_eq!(summary.verifiable_data_structure, Some(1));

        let list = ReceiptArgs {
            command: ReceiptCommand::List {
                statement: statement.clone(),
                json: true,
            },
        };
        assert_eq!(run_receipt(&list).unwrap(), EXIT_OK);

        let stripped = dir.path().join("stripped.cbor");
        let strip = ReceiptArgs {
            command: ReceiptCommand::Strip {
                statement,
                out: Some(stripped.clone()),
            },
        };
        assert_eq!(run_receipt(&strip).unwrap(), EXIT_OK);
        assert!(receipts(&std::fs::read(&stripped).unwrap())
            .unwrap()
            .is_empty());
    }
}
