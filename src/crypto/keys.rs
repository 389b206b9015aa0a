//! The vault cipher key and the password-verifier derived from it.
//!
//! The verifier is `HMAC-SHA256(verifier_key, salt)` where
//! `verifier_key = HKDF-SHA256(cipher_key, info = "pmvault-verifier")`.
//! Version 1 vaults used the cipher key directly as the HMAC key; that
//! scheme is kept only so legacy files can still be opened.

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{PmVaultError, Result};

/// Length of the vault cipher key (256 bits, for AES-256-GCM).
pub const KEY_LEN: usize = 32;

/// Length of a password verifier (one HMAC-SHA256 output).
pub const VERIFIER_LEN: usize = 32;

/// HKDF `info` label for the verifier sub-key.
const VERIFIER_INFO: &[u8] = b"pmvault-verifier";

/// A 32-byte vault cipher key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct CipherKey {
    bytes: [u8; KEY_LEN],
}

impl CipherKey {
    /// Create a new `CipherKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Copy a key out of a slice, which must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
            PmVaultError::InvalidInput(format!(
                "cipher key must be {KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Access the raw key bytes (e.g. to pass to the cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Compute the current-format password verifier for `salt`.
    pub fn verifier(&self, salt: &[u8]) -> Result<Vec<u8>> {
        let verifier_key = hkdf_derive(&self.bytes, VERIFIER_INFO)?;
        hmac_sha256(&verifier_key[..], salt)
    }

    /// Compute the version 1 password verifier for `salt`.
    pub fn legacy_verifier(&self, salt: &[u8]) -> Result<Vec<u8>> {
        hmac_sha256(&self.bytes, salt)
    }
}

/// Run HKDF-SHA256 expand with the given `info`.
///
/// The extract step gets no salt; the input already came out of PBKDF2.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    hk.expand(info, &mut okm[..])
        .map_err(|e| PmVaultError::InvalidInput(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| PmVaultError::InvalidInput(format!("invalid HMAC key: {e}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}
