//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! The iteration count is stored in every vault's metadata so it can be
//! raised for new vaults without breaking old ones.  Parameters are
//! configurable via `KdfParams` (loaded from `pmconfig.toml` or defaults).

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::keys::{CipherKey, KEY_LEN};
use super::random::fill_random;
use crate::errors::{PmVaultError, Result};

/// Default salt length in bytes.
pub const DEFAULT_SALT_LEN: usize = 16;

/// Shortest salt accepted for derivation.
pub const MIN_SALT_LEN: usize = 8;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 210_000;

/// Minimum iteration count, to prevent dangerously weak KDF settings.
pub const MIN_ITERATIONS: u32 = 1_000;

/// Maximum iteration count accepted from a file or config.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Configurable key-derivation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// PBKDF2 iteration count (default: 210 000).
    pub iterations: u32,
    /// Length of freshly generated salts (default: 16).
    pub salt_len: usize,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            salt_len: DEFAULT_SALT_LEN,
        }
    }
}

/// Generate a cryptographically random salt of `len` bytes.
pub fn generate_salt(len: usize) -> Result<Vec<u8>> {
    if len < MIN_SALT_LEN {
        return Err(PmVaultError::InvalidInput(format!(
            "salt must be at least {MIN_SALT_LEN} bytes (got {len})"
        )));
    }
    let mut salt = vec![0u8; len];
    fill_random(&mut salt)?;
    Ok(salt)
}

/// Derive a `key_len`-byte key from a password and salt.
///
/// The same password + salt + iterations always produce the same key.
pub fn derive_key(
    password: &str,
    salt: &[u8],
    key_len: usize,
    iterations: u32,
) -> Result<Zeroizing<Vec<u8>>> {
    if password.trim().is_empty() {
        return Err(PmVaultError::InvalidInput(
            "password cannot be empty".into(),
        ));
    }
    if salt.len() < MIN_SALT_LEN {
        return Err(PmVaultError::InvalidInput(format!(
            "salt must be at least {MIN_SALT_LEN} bytes (got {})",
            salt.len()
        )));
    }
    if !matches!(key_len, 16 | 24 | 32) {
        return Err(PmVaultError::InvalidInput(format!(
            "key length must be 16, 24 or 32 bytes (got {key_len})"
        )));
    }
    if iterations < MIN_ITERATIONS {
        return Err(PmVaultError::InvalidInput(format!(
            "iterations must be at least {MIN_ITERATIONS} (got {iterations})"
        )));
    }

    let mut key = Zeroizing::new(vec![0u8; key_len]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    Ok(key)
}

/// Derive the 32-byte vault cipher key.
pub fn derive_cipher_key(password: &str, salt: &[u8], iterations: u32) -> Result<CipherKey> {
    let derived = derive_key(password, salt, KEY_LEN, iterations)?;
    CipherKey::from_slice(&derived)
}

/// Compute the password-verification tag for a password and salt.
///
/// The tag is an HMAC over the salt under a key that is HKDF-separated
/// from the cipher key, so it reveals nothing about the cipher key.
pub fn compute_verifier(password: &str, salt: &[u8], iterations: u32) -> Result<Vec<u8>> {
    derive_cipher_key(password, salt, iterations)?.verifier(salt)
}

/// Compare two verification tags in constant time.
pub fn verifier_matches(expected: &[u8], actual: &[u8]) -> bool {
    expected.ct_eq(actual).into()
}
