// siftlock/src/main.rs
//! Siftlock entry point: parses the CLI, wires up logging and config, and
//! dispatches to the command implementations.

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use siftlock::cli::{Cli, Commands};
use siftlock::{commands, logger};
use siftlock_core::ScanConfig;

fn main() -> Result<()> {
    let args = Cli::parse();

    if args.quiet {
        logger::init_logger(Some(LevelFilter::Off));
    } else if args.debug {
        logger::init_logger(Some(LevelFilter::Debug));
    } else {
        logger::init_logger(None);
    }

    let config = match &args.config {
        Some(path) => ScanConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ScanConfig::default(),
    };

    match &args.command {
        Commands::Scan(cmd) => commands::scan::run(cmd, config, args.quiet),
        Commands::GenSeed => commands::vault::run_gen_seed(args.quiet),
        Commands::Unlock(cmd) => commands::vault::run_unlock(cmd),
    }
}
