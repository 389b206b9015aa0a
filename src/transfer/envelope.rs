//! Export envelopes: one record, encrypted for one recipient.
//!
//! ```text
//! [wrapped_key_len: 4 bytes BE][RSA-OAEP(record key)][nonce | tag | ciphertext]
//! ```
//!
//! The record is encrypted with a fresh random 32-byte AES-256-GCM key,
//! and that key is wrapped with the recipient's RSA public key.

use std::fs;
use std::path::Path;

use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::encryption::{decrypt, encrypt, MIN_PACKED_LEN};
use crate::crypto::pem::{self, PRIVATE_KEY_LABEL, PUBLIC_KEY_LABEL};
use crate::crypto::random::fill_random;
use crate::crypto::rsa_keys::{decrypt_with_private_key, encrypt_with_public_key, generate_key_pair};
use crate::errors::{PmVaultError, Result};
use crate::vault::format::write_atomic;
use crate::vault::Record;

use super::key_material::KeyMaterial;

/// Size of the big-endian wrapped-key length prefix.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Length of the one-time record key.
pub const RECORD_KEY_LEN: usize = 32;

/// Encrypt `record` so only the holder of the matching private key can
/// read it.
pub fn export_record(record: &Record, recipient_public_der: &[u8]) -> Result<Vec<u8>> {
    // 1. Serialize the record.
    let plaintext = Zeroizing::new(
        serde_json::to_vec(record)
            .map_err(|e| PmVaultError::SerializationError(format!("record: {e}")))?,
    );

    // 2. Encrypt it under a fresh one-time key.
    let mut record_key = Zeroizing::new([0u8; RECORD_KEY_LEN]);
    fill_random(&mut record_key[..])?;
    let payload = encrypt(&record_key[..], &plaintext, None)?;

    // 3. Wrap the one-time key for the recipient.
    let wrapped = encrypt_with_public_key(recipient_public_der, &record_key[..])?;
    let wrapped_len = u32::try_from(wrapped.len()).map_err(|_| {
        PmVaultError::SerializationError(format!(
            "wrapped key length {} exceeds u32::MAX",
            wrapped.len()
        ))
    })?;

    // 4. Pack: [len][wrapped key][payload].
    let mut out = Vec::with_capacity(LENGTH_PREFIX_LEN + wrapped.len() + payload.len());
    out.extend_from_slice(&wrapped_len.to_be_bytes());
    out.extend_from_slice(&wrapped);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decrypt an envelope produced by `export_record`.
///
/// The returned record always has a new identifier and new timestamps.
pub fn import_record(private_der: &[u8], envelope: &[u8]) -> Result<Record> {
    if envelope.len() < LENGTH_PREFIX_LEN {
        return Err(corrupt("envelope is shorter than its length prefix"));
    }

    let (prefix, rest) = envelope.split_at(LENGTH_PREFIX_LEN);
    let prefix: [u8; LENGTH_PREFIX_LEN] = prefix
        .try_into()
        .map_err(|_| corrupt("bad wrapped key length"))?;
    let wrapped_len = usize::try_from(u32::from_be_bytes(prefix))
        .map_err(|_| corrupt("wrapped key length exceeds platform address space"))?;

    if wrapped_len == 0 || wrapped_len > rest.len() {
        return Err(corrupt(format!(
            "wrapped key length {wrapped_len} does not fit in {} remaining bytes",
            rest.len()
        )));
    }
    let (wrapped, payload) = rest.split_at(wrapped_len);
    if payload.len() < MIN_PACKED_LEN {
        return Err(corrupt("encrypted record is truncated"));
    }

    // 1. Unwrap the one-time key.
    let record_key = decrypt_with_private_key(private_der, wrapped)?;
    if record_key.len() != RECORD_KEY_LEN {
        return Err(corrupt(format!(
            "unwrapped key is {} bytes, expected {RECORD_KEY_LEN}",
            record_key.len()
        )));
    }

    // 2. Decrypt and deserialize the record.
    let plaintext = decrypt(&record_key, payload, None)?;
    let record: Record = serde_json::from_slice(&plaintext)
        .map_err(|e| corrupt(format!("record JSON: {e}")))?;

    Ok(record.with_fresh_identity())
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

/// Generate a key pair and write it to two files.
///
/// With `armor` the files are PEM text, otherwise raw DER.
pub fn generate_key_files(
    public_path: &Path,
    private_path: &Path,
    bits: usize,
    armor: bool,
) -> Result<()> {
    let pair = generate_key_pair(bits)?;

    let (public_bytes, private_bytes) = if armor {
        let public_pem = pem::encode(&pair.public_der, PUBLIC_KEY_LABEL);
        let private_pem = pem::encode(&pair.private_der, PRIVATE_KEY_LABEL);
        (
            public_pem.as_bytes().to_vec(),
            Zeroizing::new(private_pem.as_bytes().to_vec()),
        )
    } else {
        (pair.public_der.clone(), pair.private_der.clone())
    };

    // Private key first, removed again if the public half cannot be written.
    write_atomic(private_path, &private_bytes)?;
    if let Err(e) = write_atomic(public_path, &public_bytes) {
        let _ = fs::remove_file(private_path);
        return Err(e);
    }

    debug!(
        public = %public_path.display(),
        private = %private_path.display(),
        bits,
        armor,
        "key pair written"
    );
    Ok(())
}

/// Export `record` for the public key stored at `public_key_path`.
pub fn export_to_file(record: &Record, public_key_path: &Path, out_path: &Path) -> Result<()> {
    let key = KeyMaterial::read(public_key_path)?;
    let envelope = export_record(record, key.public_key_der()?)?;
    write_atomic(out_path, &envelope)?;

    debug!(out = %out_path.display(), pem = key.is_pem(), "record exported");
    Ok(())
}

/// Import a record from an envelope file with the private key stored at
/// `private_key_path`.
pub fn import_from_file(private_key_path: &Path, in_path: &Path) -> Result<Record> {
    let key = KeyMaterial::read(private_key_path)?;
    let envelope = fs::read(in_path)?;
    let record = import_record(key.private_key_der()?, &envelope)?;

    debug!(input = %in_path.display(), pem = key.is_pem(), "record imported");
    Ok(record)
}

fn corrupt(msg: impl Into<String>) -> PmVaultError {
    PmVaultError::CorruptData(msg.into())
}
