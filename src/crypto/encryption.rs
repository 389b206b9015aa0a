//! AES-GCM authenticated encryption.
//!
//! The key length selects the variant: 16 bytes for AES-128-GCM, 24 for
//! AES-192-GCM, 32 for AES-256-GCM.  Each call to `encrypt` generates a
//! fresh random 12-byte nonce.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | 16-byte auth tag | ciphertext ]
//!
//! The ciphertext is exactly as long as the plaintext.

use aes_gcm::aead::consts::{U12, U16};
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use zeroize::Zeroizing;

use super::random::fill_random;
use crate::errors::{PmVaultError, Result};

type Aes192Gcm = AesGcm<Aes192, U12>;

/// Size of the AES-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Smallest valid packed buffer: nonce + tag with an empty ciphertext.
pub const MIN_PACKED_LEN: usize = NONCE_LEN + TAG_LEN;

/// Encrypt `plaintext` with a 16, 24 or 32-byte `key`.
///
/// `associated_data` is authenticated but not encrypted; the same value
/// must be supplied to `decrypt`.
pub fn encrypt(key: &[u8], plaintext: &[u8], associated_data: Option<&[u8]>) -> Result<Vec<u8>> {
    validate_key_len(key)?;
    let aad = associated_data.unwrap_or_default();

    let mut nonce = [0u8; NONCE_LEN];
    fill_random(&mut nonce)?;

    // Encrypt in place on a zeroizing copy so a failed call leaves no
    // plaintext behind.
    let mut buffer = Zeroizing::new(plaintext.to_vec());
    let tag = match key.len() {
        16 => seal::<Aes128Gcm>(key, &nonce, aad, &mut buffer)?,
        24 => seal::<Aes192Gcm>(key, &nonce, aad, &mut buffer)?,
        _ => seal::<Aes256Gcm>(key, &nonce, aad, &mut buffer)?,
    };

    let mut output = Vec::with_capacity(MIN_PACKED_LEN + buffer.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&tag);
    output.extend_from_slice(&buffer);
    Ok(output)
}

/// Decrypt data that was produced by `encrypt`.
///
/// Returns `AuthenticationFailure` when the tag does not verify; no
/// plaintext is ever returned in that case.
pub fn decrypt(
    key: &[u8],
    packed: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Zeroizing<Vec<u8>>> {
    validate_key_len(key)?;
    if packed.len() < MIN_PACKED_LEN {
        return Err(PmVaultError::InvalidInput(format!(
            "packed ciphertext must be at least {MIN_PACKED_LEN} bytes, got {}",
            packed.len()
        )));
    }
    let aad = associated_data.unwrap_or_default();

    let (nonce, rest) = packed.split_at(NONCE_LEN);
    let (tag, ciphertext) = rest.split_at(TAG_LEN);

    let mut buffer = Zeroizing::new(ciphertext.to_vec());
    match key.len() {
        16 => open::<Aes128Gcm>(key, nonce, tag, aad, &mut buffer)?,
        24 => open::<Aes192Gcm>(key, nonce, tag, aad, &mut buffer)?,
        _ => open::<Aes256Gcm>(key, nonce, tag, aad, &mut buffer)?,
    }

    Ok(buffer)
}

/// Check that `key` is a valid AES key length.
pub fn validate_key_len(key: &[u8]) -> Result<()> {
    match key.len() {
        16 | 24 | 32 => Ok(()),
        n => Err(PmVaultError::InvalidInput(format!(
            "AES key must be 16, 24 or 32 bytes, got {n}"
        ))),
    }
}

fn seal<C>(key: &[u8], nonce: &[u8], aad: &[u8], buffer: &mut [u8]) -> Result<[u8; TAG_LEN]>
where
    C: KeyInit + AeadInPlace + AeadCore<NonceSize = U12, TagSize = U16>,
{
    let cipher = C::new_from_slice(key)
        .map_err(|e| PmVaultError::InvalidInput(format!("invalid key length: {e}")))?;

    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(nonce), aad, buffer)
        .map_err(|e| PmVaultError::InvalidInput(format!("encryption error: {e}")))?;

    let mut out = [0u8; TAG_LEN];
    out.copy_from_slice(&tag);
    Ok(out)
}

fn open<C>(key: &[u8], nonce: &[u8], tag: &[u8], aad: &[u8], buffer: &mut [u8]) -> Result<()>
where
    C: KeyInit + AeadInPlace + AeadCore<NonceSize = U12, TagSize = U16>,
{
    let cipher = C::new_from_slice(key)
        .map_err(|e| PmVaultError::InvalidInput(format!("invalid key length: {e}")))?;

    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(nonce),
            aad,
            buffer,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| PmVaultError::AuthenticationFailure)
}
