// siftlock/src/cli.rs
//! Command-line interface definition for the siftlock binary: all available
//! commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "siftlock",
    version = env!("CARGO_PKG_VERSION"),
    about = "Scan and redact sensitive data before it reaches an LLM",
    long_about = "Siftlock is a command-line utility for detecting and redacting secrets and \
Personally Identifiable Information (PII) in text documents. Detected entities are replaced \
with stable placeholders so sanitized output can safely leave the machine.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Suppress all informational and debug messages.
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    /// Path to a YAML file overriding the default thresholds.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `siftlock` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scans a file or stdin and prints the redacted text with a summary.
    #[command(about = "Scan a file or stdin and print redacted output.")]
    Scan(ScanCommand),

    /// Generates a fresh 12-word vault seed phrase.
    #[command(name = "gen-seed", about = "Generate a new vault seed phrase.")]
    GenSeed,

    /// Derives vault keys from a seed phrase.
    #[command(about = "Validate a seed phrase and derive the vault keys.")]
    Unlock(UnlockCommand),
}

/// Output format for the `scan` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Redacted text plus a human-readable summary on stderr.
    Text,
    /// A single JSON report on stdout.
    Json,
}

/// Arguments for the `scan` command.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input_file: Option<PathBuf>,

    /// Write redacted output to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format.
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Include the original matched values in the report. Off by default so
    /// reports stay safe to share.
    #[arg(long)]
    pub show_values: bool,
}

/// Arguments for the `unlock` command.
#[derive(Parser, Debug)]
pub struct UnlockCommand {
    /// Hex-encoded salt from a previous unlock; a fresh random salt is
    /// generated (and printed) when omitted.
    #[arg(long = "salt-hex", value_name = "HEX")]
    pub salt_hex: Option<String>,

    /// Print the raw derived keys instead of their fingerprints.
    #[arg(long)]
    pub reveal: bool,
}
