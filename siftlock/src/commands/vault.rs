// siftlock/src/commands/vault.rs
//! `gen-seed` and `unlock` command implementations.

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;
use log::info;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::io::{self, BufRead, Write};

use siftlock_core::vault;

use crate::cli::UnlockCommand;

/// Generates and prints a fresh seed phrase. The phrase goes to stdout so
/// it can be piped; the handling warning goes to stderr.
pub fn run_gen_seed(quiet: bool) -> Result<()> {
    let seed = vault::generate_seed().context("Seed generation failed")?;
    println!("{}", seed);
    if !quiet {
        eprintln!("Write this phrase down and store it offline. It cannot be recovered.");
    }
    Ok(())
}

/// Reads the seed phrase without echoing when attached to a terminal;
/// piped input is read as a single line.
fn read_seed_phrase() -> Result<String> {
    if io::stdin().is_terminal() {
        rpassword::prompt_password("Seed phrase: ").context("Failed to read seed phrase")
    } else {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read seed phrase from stdin")?;
        Ok(line)
    }
}

/// Short, non-reversible identifier for a derived key. Lets two unlocks be
/// compared without printing key material.
fn fingerprint(key: &[u8]) -> String {
    let digest = Sha256::digest(key);
    hex::encode(&digest[..8])
}

/// Runs the `unlock` command: validates the phrase, derives the key pair
/// and prints the salt plus key fingerprints (or raw keys with --reveal).
pub fn run_unlock(cmd: &UnlockCommand) -> Result<()> {
    let seed = read_seed_phrase()?;
    if !vault::validate_seed(&seed) {
        bail!("Seed phrase failed validation: not a valid 12-word phrase.");
    }

    let salt = match &cmd.salt_hex {
        Some(hex_salt) => hex::decode(hex_salt).context("--salt-hex is not valid hex")?,
        None => {
            let mut salt = vec![0u8; 16];
            rand::rng().fill_bytes(&mut salt);
            salt
        }
    };

    info!("Deriving vault keys.");
    let keys = vault::derive_keys(&seed, &salt).context("Key derivation failed")?;

    let mut stdout = io::stdout();
    writeln!(stdout, "salt: {}", hex::encode(&salt))?;
    if cmd.reveal {
        writeln!(stdout, "storage_key: {}", keys.storage_key_hex())?;
        writeln!(stdout, "session_key: {}", keys.session_key_hex())?;
    } else {
        writeln!(stdout, "storage_key_fingerprint: {}", fingerprint(&keys.storage_key))?;
        writeln!(stdout, "session_key_fingerprint: {}", fingerprint(&keys.session_key))?;
    }
    writeln!(stdout, "session_token: {}", vault::generate_session_token())?;
    Ok(())
}
