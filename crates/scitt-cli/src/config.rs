//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`:
//!
//! ```yaml
//! issuer:
//!   kid: log-2026
//!   alg: -8
//! ```
//!
//! Command-line flags override file values. Without either, the issuer
//! uses `EdDSA` and a key id derived from the public key.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use scitt_core::{hex, Algorithm};
use scitt_crypto::Ed25519PublicKey;
use scitt_receipt::Issuer;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub issuer: IssuerConfig,
}

/// Issuer parameters written into every receipt's protected header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssuerConfig {
    /// Key identifier, as UTF-8 text.
    pub kid: Option<String>,
    /// COSE algorithm identifier.
    pub alg: Option<Algorithm>,
}

impl CliConfig {
    /// Load from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Resolve the issuer for `public_key`. `kid_override` wins over the
    /// file; the fallback kid is the hex of the key's first 8 bytes.
    pub fn issuer(&self, public_key: &Ed25519PublicKey, kid_override: Option<&str>) -> Issuer {
        let kid = kid_override
            .or(self.issuer.kid.as_deref())
            .map(|k| k.as_bytes().to_vec())
            .unwrap_or_else(|| hex::encode(&public_key.default_kid()).into_bytes());
        Issuer::new(self.issuer.alg.unwrap_or(Algorithm::EDDSA), kid)
    }
}
