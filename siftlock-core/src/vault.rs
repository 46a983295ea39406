// siftlock-core/src/vault.rs
//! Vault key derivation.
//!
//! Separates an unlock seed phrase into independent storage and session
//! keys: Argon2id over the phrase yields a master key, HKDF-SHA256 expands
//! it under distinct context labels. Deterministic for a fixed
//! (seed, salt) pair so storage access can be re-derived on later unlocks
//! from a persisted salt; the seed phrase itself is never persisted,
//! directly or indirectly, anywhere in the system.
//!
//! License: MIT OR Apache-2.0

use argon2::{Algorithm, Argon2, Params, Version};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;

use crate::errors::CoreError;

/// Argon2id parameters (OWASP-recommended): time cost 3, 64 MiB memory,
/// parallelism 4, 32-byte output.
const ARGON2_TIME_COST: u32 = 3;
const ARGON2_MEMORY_KIB: u32 = 64 * 1024;
const ARGON2_PARALLELISM: u32 = 4;
const KEY_LEN: usize = 32;

const STORAGE_KEY_INFO: &[u8] = b"siftlock-storage-key";
const SESSION_KEY_INFO: &[u8] = b"siftlock-session-key";

/// The two independent subkeys derived from one unlock.
pub struct DerivedKeys {
    pub storage_key: [u8; KEY_LEN],
    pub session_key: [u8; KEY_LEN],
}

impl DerivedKeys {
    pub fn storage_key_hex(&self) -> String {
        hex::encode(self.storage_key)
    }

    pub fn session_key_hex(&self) -> String {
        hex::encode(self.session_key)
    }
}

// Keys must never leak through Debug formatting.
impl std::fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKeys")
            .field("storage_key", &"[32 bytes]")
            .field("session_key", &"[32 bytes]")
            .finish()
    }
}

/// Checks a seed phrase against the BIP-39 wordlist and checksum. Blank
/// input is invalid.
pub fn validate_seed(seed_phrase: &str) -> bool {
    let trimmed = seed_phrase.trim();
    if trimmed.is_empty() {
        return false;
    }
    bip39::Mnemonic::parse_normalized(trimmed).is_ok()
}

/// Generates a fresh 12-word (128-bit) seed phrase from OS randomness.
pub fn generate_seed() -> Result<String, CoreError> {
    let mut entropy = [0u8; 16];
    rand::rng().fill_bytes(&mut entropy);
    let mnemonic = bip39::Mnemonic::from_entropy(&entropy)
        .map_err(|e| CoreError::KeyDerivation(format!("seed generation failed: {}", e)))?;
    Ok(mnemonic.to_string())
}

/// Derives the storage/session key pair from a validated seed phrase and
/// salt. Identical (seed, salt) inputs always reproduce identical keys;
/// different salts yield different keys for the same seed.
pub fn derive_keys(seed_phrase: &str, salt: &[u8]) -> Result<DerivedKeys, CoreError> {
    if !validate_seed(seed_phrase) {
        return Err(CoreError::Validation(
            "seed phrase failed wordlist/checksum validation".to_string(),
        ));
    }
    if salt.len() < 8 {
        return Err(CoreError::Validation(format!(
            "salt must be at least 8 bytes, got {}",
            salt.len()
        )));
    }

    let params = Params::new(ARGON2_MEMORY_KIB, ARGON2_TIME_COST, ARGON2_PARALLELISM, Some(KEY_LEN))
        .map_err(|e| CoreError::KeyDerivation(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut master_key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(seed_phrase.trim().as_bytes(), salt, &mut master_key)
        .map_err(|e| CoreError::KeyDerivation(e.to_string()))?;

    let hkdf = Hkdf::<Sha256>::new(Some(salt), &master_key);
    let mut storage_key = [0u8; KEY_LEN];
    let mut session_key = [0u8; KEY_LEN];
    hkdf.expand(STORAGE_KEY_INFO, &mut storage_key)
        .map_err(|e| CoreError::KeyDerivation(e.to_string()))?;
    hkdf.expand(SESSION_KEY_INFO, &mut session_key)
        .map_err(|e| CoreError::KeyDerivation(e.to_string()))?;

    Ok(DerivedKeys {
        storage_key,
        session_key,
    })
}

/// Opaque random session token, 32 bytes of OS randomness.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Standard BIP-39 test vector (all-zero entropy).
    const SEED: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_validate_seed() {
        assert!(validate_seed(SEED));
        assert!(validate_seed(&format!("  {}  ", SEED)));
        assert!(!validate_seed(""));
        assert!(!validate_seed("   "));
        assert!(!validate_seed("not a real seed phrase at all honestly"));
        // Right words, broken checksum.
        assert!(!validate_seed(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon"
        ));
    }

    #[test]
    fn test_generated_seed_validates() {
        let seed = generate_seed().unwrap();
        assert_eq!(seed.split_whitespace().count(), 12);
        assert!(validate_seed(&seed));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let salt = [7u8; 32];
        let a = derive_keys(SEED, &salt).unwrap();
        let b = derive_keys(SEED, &salt).unwrap();
        assert_eq!(a.storage_key, b.storage_key);
        assert_eq!(a.session_key, b.session_key);
    }

    #[test]
    fn test_different_salts_diverge() {
        let a = derive_keys(SEED, &[7u8; 32]).unwrap();
        let b = derive_keys(SEED, &[8u8; 32]).unwrap();
        assert_ne!(a.storage_key, b.storage_key);
        assert_ne!(a.session_key, b.session_key);
    }

    #[test]
    fn test_subkeys_are_independent() {
        let keys = derive_keys(SEED, &[7u8; 32]).unwrap();
        assert_ne!(keys.storage_key, keys.session_key);
    }

    #[test]
    fn test_invalid_seed_rejected_before_derivation() {
        assert!(matches!(
            derive_keys("bogus phrase", &[7u8; 32]),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_short_salt_rejected() {
        assert!(matches!(
            derive_keys(SEED, &[1u8; 4]),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_debug_never_prints_key_material() {
        let keys = derive_keys(SEED, &[7u8; 32]).unwrap();
        let debug = format!("{:?}", keys);
        assert!(!debug.contains(&keys.storage_key_hex()));
    }

    #[test]
    fn test_session_tokens_are_unique() {
        assert_ne!(generate_session_token(), generate_session_token());
    }
}
