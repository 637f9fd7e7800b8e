//! # scitt-cli — Transparency Receipt Command-Line Interface
//!
//! Provides the `scitt` binary over the receipt protocol crates. Every
//! file the CLI reads or writes is either hex text (keys, leaf hashes) or
//! raw CBOR (receipts, statements).
//!
//! ## Subcommands
//!
//! - `keygen`: Ed25519 key pair generation
//! - `leaf` / `root`: RFC 9162 leaf and root hashing
//! - `inclusion`: inclusion receipt issue and verify
//! - `consistency`: consistency receipt issue and verify
//! - `receipt`: add, list, and strip receipts on a signed statement
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success / verified |
//! | 1 | receipt rejected |
//! | 2 | input could not be processed |
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the protocol. Handlers read files,
//!   call `scitt-receipt`, and print the outcome.
//! - Handlers return `anyhow::Result<u8>`; the binary maps `Err` to 2.

pub mod config;
pub mod consistency;
pub mod inclusion;
pub mod keys;
pub mod receipt;
pub mod tree;

use std::path::Path;

use anyhow::{Context, Result};

use scitt_core::Digest;

/// Exit code for a verified receipt or a successful command.
pub const EXIT_OK: u8 = 0;
/// Exit code for a receipt whose signature or proof was rejected.
pub const EXIT_REJECTED: u8 = 1;
/// Exit code for input that could not be processed.
pub const EXIT_ERROR: u8 = 2;

/// Read a leaf-hash list: one hex digest per line, blank lines and lines
/// starting with `#` ignored.
pub fn read_leaves(path: &Path) -> Result<Vec<Digest>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read leaves file: {}", path.display()))?;
    text.lines()
        .enumerate()
        .map(|(n, line)| (n, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| {
            Digest::from_hex(line)
                .with_context(|| format!("{}:{}: invalid leaf hash", path.display(), n + 1))
        })
        .collect()
}

/// Read a binary file.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Write a binary file.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

/// Print a verification outcome and return its exit code.
pub fn report(verified: bool, what: &str, json: bool) -> Result<u8> {
    if json {
        println!(
            "{}",
            serde_json::to_string(&serde_json::json!({ "verified": verified, "receipt": what }))?
        );
    } else if verified {
        println!("OK: {what} verified");
    } else {
        println!("FAIL: {what} rejected");
    }
    Ok(if verified { EXIT_OK } else { EXIT_REJECTED })
}
