//! # scitt CLI entry point
//!
//! Parses command-line arguments, initializes logging, and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scitt_cli::config::CliConfig;
use scitt_cli::consistency::{run_consistency, ConsistencyArgs};
use scitt_cli::inclusion::{run_inclusion, InclusionArgs};
use scitt_cli::keys::{run_keygen, KeygenArgs};
use scitt_cli::receipt::{run_receipt, ReceiptArgs};
use scitt_cli::tree::{run_leaf, run_root, LeafArgs, RootArgs};
use scitt_cli::EXIT_ERROR;

/// Transparency receipts over RFC 9162 Merkle trees and COSE_Sign1.
#[derive(Parser, Debug)]
#[command(name = "scitt", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit log lines as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 issuer key pair.
    Keygen(KeygenArgs),

    /// Print the RFC 9162 leaf hash of each entry file.
    Leaf(LeafArgs),

    /// Print the root of a leaves file.
    Root(RootArgs),

    /// Issue, verify, and merge inclusion receipts.
    Inclusion(InclusionArgs),

    /// Issue and verify consistency receipts.
    Consistency(ConsistencyArgs),

    /// Add, list, and strip receipts on a signed statement.
    Receipt(ReceiptArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let result = match cli.command {
        Commands::Keygen(args) => run_keygen(&args),
        Commands::Leaf(args) => run_leaf(&args),
        Commands::Root(args) => run_root(&args),
        Commands::Inclusion(args) => run_inclusion(&args, &config),
        Commands::Consistency(args) => run_consistency(&args, &config),
        Commands::Receipt(args) => run_receipt(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("ERROR: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scitt_cli::inclusion::InclusionCommand;

    #[test]
    fn cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "scitt",
            "-vv",
            "--log-json",
            "--config",
            "scitt.yaml",
            "root",
            "--leaves",
            "leaves.txt",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
        assert_eq!(cli.config, Some(PathBuf::from("scitt.yaml")));
        assert!(matches!(cli.command, Commands::Root(_)));
    }

    #[test]
    fn cli_parse_inclusion_issue_multiple_indices() {
        let cli = Cli::try_parse_from([
            "scitt",
            "inclusion",
            "issue",
            "--leaves",
            "leaves.txt",
            "--index",
            "1",
            "--index",
            "4",
            "--key",
            "log.key",
            "--out",
            "r.cbor",
        ])
        .unwrap();
        let Commands::Inclusion(args) = cli.command else {
            panic!("expected inclusion command");
        };
        let InclusionCommand::Issue { indices, .. } = args.command else {
            panic!("expected issue");
        };
        assert_eq!(indices, vec![1, 4]);
    }

    #[test]
    fn cli_parse_inclusion_issue_requires_index() {
        let parsed = Cli::try_parse_from([
            "scitt",
            "inclusion",
            "issue",
            "--leaves",
            "leaves.txt",
            "--key",
            "log.key",
            "--out",
            "r.cbor",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn cli_parse_leaf_entry_conflict() {
        let parsed = Cli::try_parse_from([
            "scitt",
            "inclusion",
            "verify",
            "--receipt",
            "r.cbor",
            "--leaf",
            "00",
            "--entry",
            "e.txt",
            "--public-key",
            "log.pub",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn cli_parse_receipt_list() {
        let cli =
            Cli::try_parse_from(["scitt", "receipt", "list", "--statement", "s.cbor", "--json"])
                .unwrap();
        assert!(matches!(cli.command, Commands::Receipt(_)));
    }
}
