//! # Consistency Subcommand
//!
//! `issue` proves that the tree a previous inclusion receipt was issued
//! for is a prefix of the current leaves file. `verify` checks such a
//! receipt against a trusted old root.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use scitt_core::Digest;
use scitt_receipt::ReceiptProtocol;

use crate::config::CliConfig;
use crate::keys::{load_signer, load_verifier};
use crate::{read_bytes, read_leaves, report, write_bytes, EXIT_OK};

/// Arguments for `scitt consistency`.
#[derive(Args, Debug)]
pub struct ConsistencyArgs {
    #[command(subcommand)]
    pub command: ConsistencyCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConsistencyCommand {
    /// Issue a consistency receipt.
    Issue {
        /// Current leaves file.
        #[arg(long)]
        leaves: PathBuf,
        /// Inclusion receipt issued for the earlier tree.
        #[arg(long)]
        previous: PathBuf,
        /// Issuer signing key (hex seed).
        #[arg(long)]
        key: PathBuf,
        /// Key identifier; overrides the config file.
        #[arg(long)]
        kid: Option<String>,
        /// Output receipt file.
        #[arg(long, short)]
        out: PathBuf,
    },

    /// Verify a consistency receipt.
    Verify {
        /// Receipt file.
        #[arg(long)]
        receipt: PathBuf,
        /// Trusted root of the earlier tree (hex).
        #[arg(long)]
        old_root: String,
        /// Issuer public key (hex).
        #[arg(long)]
        public_key: PathBuf,
        /// Require this key identifier in the protected header.
        #[arg(long)]
        kid: Option<String>,
        /// Emit the outcome as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Execute the consistency subcommand.
pub fn run_consistency(args: &ConsistencyArgs, config: &CliConfig) -> Result<u8> {
    let protocol = ReceiptProtocol::sha256();
    match &args.command {
        ConsistencyCommand::Issue {
            leaves,
            previous,
            key,
            kid,
            out,
        } => {
            let leaves = read_leaves(leaves)?;
            let previous = read_bytes(previous)?;
            let signer = load_signer(key)?;
            let issuer = config.issuer(&signer.public_key(), kid.as_deref());
            let receipt = protocol
                .sign_consistency_proof(&leaves, &previous, &signer, &issuer)
                .context("failed to issue consistency receipt")?;
            write_bytes(out, &receipt)?;
            println!(
                "OK: wrote consistency receipt for tree size {} to {}",
                leaves.len(),
                out.display()
            );
            Ok(EXIT_OK)
        }

        ConsistencyCommand::Verify {
            receipt,
            old_root,
            public_key,
            kid,
            json,
        } => {
            let old_root = Digest::from_hex(old_root).context("invalid old root")?;
            let receipt = read_bytes(receipt)?;
            let verifier = load_verifier(public_key, kid.as_deref())?;
            let verified = protocol.verify_consistency_proof(&old_root, &receipt, &verifier)?;
            report(verified, "consistency receipt", *json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inclusion::{run_inclusion, InclusionArgs, InclusionCommand};
    use crate::keys::{run_keygen, KeygenArgs};
    use scitt_crypto::HashTree;
    use std::path::Path;

    fn write_leaves(path: &Path, n: usize) -> Vec<Digest> {
        let tree = HashTree::sha256();
        let leaves: Vec<Digest> = (0..n).map(|i| tree.leaf(&[i as u8])).collect();
        let text: String = leaves.iter().map(|l| format!("{l}\n")).collect();
        std::fs::write(path, text).unwrap();
        leaves
    }

    #[test]
    fn issue_then_verify() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path();
        run_keygen(&KeygenArgs {
            output: d.to_path_buf(),
            prefix: "log".into(),
            force: false,
        })
        .unwrap();
        let config = CliConfig::default();

        let old = write_leaves(&d.join("old.txt"), 3);
        let inclusion = InclusionArgs {
            command: InclusionCommand::Issue {
                leaves: d.join("old.txt"),
                indices: vec![0],
                key: d.join("log.key"),
                kid: None,
                out: d.join("inclusion.cbor"),
            },
        };
        run_inclusion(&inclusion, &config).unwrap();

        write_leaves(&d.join("new.txt"), 7);
        let issue = ConsistencyArgs {
            command: ConsistencyCommand::Issue {
                leaves: d.join("new.txt"),
                previous: d.join("inclusion.cbor"),
                key: d.join("log.key"),
                kid: None,
                out: d.join("consistency.cbor"),
            },
        };
        assert_eq!(run_consistency(&issue, &config).unwrap(), EXIT_OK);

        let verify = |old_root: Digest| {
            run_consistency(
                &ConsistencyArgs {
                    command: ConsistencyCommand::Verify {
                        receipt: d.join("consistency.cbor"),
                        old_root: old_root.to_hex(),
                        public_key: d.join("log.pub"),
                        kid: None,
                        json: false,
                    },
                },
                &config,
            )
            .unwrap()
        };
        let tree = HashTree::sha256();
        assert_eq!(verify(tree.root(&old)), 0);
        assert_eq!(verify(tree.root(&old[..2])), 1);
    }
}
