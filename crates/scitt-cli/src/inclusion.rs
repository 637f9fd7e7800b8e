//! # Inclusion Subcommand
//!
//! - `issue`: sign the tree head of a leaves file and write a detached
//!   receipt proving one or more leaf indices.
//! - `verify`: check a receipt against a leaf hash (or an entry file that
//!   is hashed first) and a public key.
//! - `merge`: combine two receipts over the same signed root.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use scitt_core::Digest;
use scitt_crypto::HashTree;
use scitt_receipt::ReceiptProtocol;

use crate::config::CliConfig;
use crate::keys::{load_signer, load_verifier};
use crate::{read_bytes, read_leaves, report, write_bytes, EXIT_OK};

/// Arguments for `scitt inclusion`.
#[derive(Args, Debug)]
pub struct InclusionArgs {
    #[command(subcommand)]
    pub command: InclusionCommand,
}

#[derive(Subcommand, Debug)]
pub enum InclusionCommand {
    /// Issue an inclusion receipt.
    Issue {
        /// Leaves file: one hex leaf hash per line.
        #[arg(long)]
        leaves: PathBuf,
        /// Leaf index to prove. Repeat for a multi-proof receipt.
        #[arg(long = "index", required = true)]
        indices: Vec<u64>,
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

    /// Verify an inclusion receipt.
    Verify {
        /// Receipt file.
        #[arg(long)]
        receipt: PathBuf,
        /// Leaf hash (hex). Repeat to verify a multi-proof receipt.
        #[arg(long = "leaf", conflicts_with = "entry")]
        leaves: Vec<String>,
        /// Entry file; its RFC 9162 leaf hash is verified.
        #[arg(long)]
        entry: Option<PathBuf>,
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

    /// Merge the inclusion proofs of two receipts over the same root.
    Merge {
        receipt: PathBuf,
        other: PathBuf,
        /// Output receipt file.
        #[arg(long, short)]
        out: PathBuf,
    },
}

/// Execute the inclusion subcommand.
pub fn run_inclusion(args: &InclusionArgs, config: &CliConfig) -> Result<u8> {
    let protocol = ReceiptProtocol::sha256();
    match &args.command {
        InclusionCommand::Issue {
            leaves,
            indices,
            key,
            kid,
            out,
        } => {
            let leaves = read_leaves(leaves)?;
            let signer = load_signer(key)?;
            let issuer = config.issuer(&signer.public_key(), kid.as_deref());
            let receipt = protocol
                .sign_inclusion_proofs(&leaves, indices, &signer, &issuer)
                .context("failed to issue inclusion receipt")?;
            write_bytes(out, &receipt)?;
            println!(
                "OK: wrote inclusion receipt for {} leaf(s) of tree size {} to {}",
                indices.len(),
                leaves.len(),
                out.display()
            );
            Ok(EXIT_OK)
        }

        InclusionCommand::Verify {
            receipt,
            leaves,
            entry,
            public_key,
            kid,
            json,
        } => {
            let receipt = read_bytes(receipt)?;
            let verifier = load_verifier(public_key, kid.as_deref())?;
            let leaves: Vec<Digest> = match entry {
                Some(path) => vec![HashTree::sha256().leaf(&read_bytes(path)?)],
                None => leaves
                    .iter()
                    .map(|h| Digest::from_hex(h).context("invalid leaf hash"))
                    .collect::<Result<_>>()?,
            };
            let verified = match leaves.as_slice() {
                [] => bail!("one of --leaf or --entry is required"),
                [leaf] => protocol.verify_inclusion_proof(leaf, &receipt, &verifier)?,
                many => protocol.verify_multiple(many, &receipt, &verifier)?,
            };
            report(verified, "inclusion receipt", *json)
        }

        InclusionCommand::Merge {
            receipt,
            other,
            out,
        } => {
            let merged = protocol
                .merge_inclusion_proofs(&read_bytes(receipt)?, &read_bytes(other)?)
                .context("failed to merge receipts")?;
            write_bytes(out, &merged)?;
            println!("OK: wrote merged receipt to {}", out.display());
            Ok(EXIT_OK)
        }
    }
}
