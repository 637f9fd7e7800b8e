//! # Keygen Subcommand and Key Files
//!
//! Key files are single-line hex: `<prefix>.key` holds the 32-byte Ed25519
//! seed, `<prefix>.pub` the 32-byte public key.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use scitt_cose::{Ed25519Signer, Ed25519Verifier};
use scitt_crypto::{Ed25519PublicKey, SigningKey};

use crate::EXIT_OK;

/// Arguments for `scitt keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Directory to write the key files into.
    #[arg(long, short)]
    pub output: PathBuf,

    /// File name prefix for the key pair.
    #[arg(long, default_value = "issuer")]
    pub prefix: String,

    /// Overwrite existing key files.
    #[arg(long)]
    pub force: bool,
}

/// Generate a key pair and write it to `<output>/<prefix>.{key,pub}`.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let key_path = args.output.join(format!("{}.key", args.prefix));
    let pub_path = args.output.join(format!("{}.pub", args.prefix));
    if !args.force && (key_path.exists() || pub_path.exists()) {
        bail!(
            "refusing to overwrite existing key files under {} (use --force)",
            args.output.display()
        );
    }

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let key = SigningKey::generate();
    let public = key.public_key();
    std::fs::write(&key_path, format!("{}\n", key.seed_hex()))
        .with_context(|| format!("failed to write {}", key_path.display()))?;
    std::fs::write(&pub_path, format!("{}\n", public.to_hex()))
        .with_context(|| format!("failed to write {}", pub_path.display()))?;

    tracing::info!(public_key = %public.to_hex(), "generated issuer key pair");
    println!("OK: wrote {} and {}", key_path.display(), pub_path.display());
    Ok(EXIT_OK)
}

/// Load a signer from a hex seed file.
pub fn load_signer(path: &Path) -> Result<Ed25519Signer> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read signing key: {}", path.display()))?;
    let key = SigningKey::from_seed_hex(text.trim())
        .with_context(|| format!("invalid signing key in {}", path.display()))?;
    Ok(Ed25519Signer::new(key))
}

/// Load a public key from a hex file.
pub fn load_public_key(path: &Path) -> Result<Ed25519PublicKey> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read public key: {}", path.display()))?;
    Ed25519PublicKey::from_hex(text.trim())
        .with_context(|| format!("invalid public key in {}", path.display()))
}

/// Load a verifier, optionally pinned to a key id.
pub fn load_verifier(path: &Path, kid: Option<&str>) -> Result<Ed25519Verifier> {
    let verifier = Ed25519Verifier::new(load_public_key(path)?);
    Ok(match kid {
        Some(kid) => verifier.with_kid(kid.as_bytes().to_vec()),
        None => verifier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keygen_writes_matching_pair() {
        let dir = tempfile::tempdir().unwrap();
        let args = KeygenArgs {
            output: dir.path().to_path_buf(),
            prefix: "log".into(),
            force: false,
        };
        assert_eq!(run_keygen(&args).unwrap(), EXIT_OK);

        let signer = load_signer(&dir.path().join("log.key")).unwrap();
        let public = load_public_key(&dir.path().join("log.pub")).unwrap();
        assert_eq!(signer.public_key(), public);
    }

    #[test]
    fn keygen_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = KeygenArgs {
            output: dir.path().to_path_buf(),
            prefix: "log".into(),
            force: false,
        };
        run_keygen(&args).unwrap();
        assert!(run_keygen(&args).is_err());
        args.force = true;
        assert_eq!(run_keygen(&args).unwrap(), EXIT_OK);
    }

    #[test]
    fn load_signer_rejects_short_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.key");
        std::fs::write(&path, "abcd\n").unwrap();
        assert!(load_signer(&path).is_err());
    }
}
