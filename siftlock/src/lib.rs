// siftlock/src/lib.rs
//! # Siftlock CLI
//!
//! Command-line front end for `siftlock-core`: scan text for secrets and
//! PII, print redacted output, and manage the vault seed phrase.

pub mod cli;
pub mod commands;
pub mod logger;
