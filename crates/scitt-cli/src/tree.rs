//! # Leaf and Root Subcommands
//!
//! `scitt leaf` hashes entry files into RFC 9162 leaf hashes, one hex
//! digest per line, so the output can be appended directly to a leaves
//! file. `scitt root` prints the tree head of such a file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use scitt_crypto::HashTree;

use crate::{read_bytes, read_leaves, EXIT_OK};

/// Arguments for `scitt leaf`.
#[derive(Args, Debug)]
pub struct LeafArgs {
    /// Entry files to hash.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for `scitt root`.
#[derive(Args, Debug)]
pub struct RootArgs {
    /// Leaves file: one hex leaf hash per line.
    #[arg(long)]
    pub leaves: PathBuf,

    /// Emit `{"tree_size": .., "root": ..}` instead of the bare root.
    #[arg(long)]
    pub json: bool,
}

pub fn run_leaf(args: &LeafArgs) -> Result<u8> {
    let tree = HashTree::sha256();
    for path in &args.files {
        println!("{}", tree.leaf(&read_bytes(path)?));
    }
    Ok(EXIT_OK)
}

pub fn run_root(args: &RootArgs) -> Result<u8> {
    let leaves = read_leaves(&args.leaves)?;
    let root = HashTree::sha256().root(&leaves);
    if args.json {
        println!(
            "{}",
            serde_json::to_string(&serde_json::json!({
                "tree_size": leaves.len(),
                "root": root,
            }))?
        );
    } else {
        println!("{root}");
    }
    Ok(EXIT_OK)
}
