//! Binary vault file format.
//!
//! A vault file has this layout:
//!
//! ```text
//! [PMV1: 4 bytes][version: 1 byte][metadata_len: 4 bytes][metadata JSON][nonce | tag | ciphertext]
//! ```
//!
//! - **Magic** (`PMV1`): identifies the file as a PmVault vault.
//! - **Version**: `2` for vaults written by this crate.  Version `1` files
//!   store `metadata_len` little-endian; version `2` stores it big-endian,
//!   like every other length field PmVault writes.
//! - **Metadata JSON**: serialized `VaultMetadata`, in cleartext.
//! - **Payload**: AES-GCM packed ciphertext of the JSON record array.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::encryption::MIN_PACKED_LEN;
use crate::crypto::kdf::{DEFAULT_ITERATIONS, MAX_ITERATIONS, MIN_ITERATIONS, MIN_SALT_LEN};
use crate::crypto::keys::VERIFIER_LEN;
use crate::errors::{PmVaultError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"PMV1";

/// Original format: little-endian metadata length, HMAC(key, salt) verifier.
pub const LEGACY_VERSION: u8 = 1;

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 2;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (metadata_len).
pub const PREFIX_LEN: usize = 9;

// ---------------------------------------------------------------------------
// VaultMetadata
// ---------------------------------------------------------------------------

/// Cleartext metadata stored ahead of the encrypted payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultMetadata {
    /// Format version; must match the version byte of the file.
    #[serde(alias = "Version")]
    pub version: String,

    /// The salt used for PBKDF2 key derivation (base64 in JSON).
    #[serde(
        alias = "Salt",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub salt: Vec<u8>,

    /// Password-verification tag (base64 in JSON).
    #[serde(
        alias = "PasswordVerifier",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub password_verifier: Vec<u8>,

    /// PBKDF2 iteration count used at vault creation.
    /// Missing in version 1 files, which always used the default.
    #[serde(default = "default_iterations", alias = "KdfIterations")]
    pub kdf_iterations: u32,
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

/// A vault file split into its parts, before any decryption.
#[derive(Debug)]
pub struct RawVault {
    pub version: u8,
    pub metadata: VaultMetadata,
    /// AES-GCM packed payload exactly as stored on disk.
    pub ciphertext: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Read a vault file from disk and split it into its parts.
pub fn read_vault(path: &Path) -> Result<RawVault> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(PmVaultError::VaultNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    parse_vault(&data)
}

/// Parse and structurally validate vault bytes.
///
/// Every length is checked against the buffer before it is used, so a
/// truncated or hostile file yields `CorruptData` rather than a panic.
pub fn parse_vault(data: &[u8]) -> Result<RawVault> {
    if data.len() < PREFIX_LEN {
        return Err(corrupt("file too small to be a valid vault"));
    }

    // --- Parse the fixed-size prefix ---

    if &data[0..4] != MAGIC {
        return Err(corrupt("missing PMV1 magic bytes"));
    }

    let version = data[4];
    let len_bytes: [u8; 4] = data[5..9]
        .try_into()
        .map_err(|_| corrupt("bad metadata length"))?;
    let metadata_len_u32 = match version {
        LEGACY_VERSION => u32::from_le_bytes(len_bytes),
        CURRENT_VERSION => u32::from_be_bytes(len_bytes),
        other => {
            return Err(corrupt(format!(
                "unsupported version {other}, expected {LEGACY_VERSION} or {CURRENT_VERSION}"
            )));
        }
    };
    let metadata_len = usize::try_from(metadata_len_u32)
        .map_err(|_| corrupt("metadata length exceeds platform address space"))?;

    if metadata_len == 0 {
        return Err(corrupt("metadata length is zero"));
    }
    let metadata_end = PREFIX_LEN
        .checked_add(metadata_len)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| corrupt("metadata length exceeds file size"))?;

    // --- Metadata ---

    let metadata: VaultMetadata = serde_json::from_slice(&data[PREFIX_LEN..metadata_end])
        .map_err(|e| corrupt(format!("metadata JSON: {e}")))?;

    if metadata.version != version.to_string() {
        return Err(corrupt(format!(
            "metadata version '{}' does not match file version {version}",
            metadata.version
        )));
    }
    if metadata.salt.len() < MIN_SALT_LEN {
        return Err(corrupt(format!(
            "salt is {} bytes, need at least {MIN_SALT_LEN}",
            metadata.salt.len()
        )));
    }
    if metadata.password_verifier.len() != VERIFIER_LEN {
        return Err(corrupt(format!(
            "password verifier is {} bytes, expected {VERIFIER_LEN}",
            metadata.password_verifier.len()
        )));
    }
    if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&metadata.kdf_iterations) {
        return Err(corrupt(format!(
            "iteration count {} is outside {MIN_ITERATIONS}..={MAX_ITERATIONS}",
            metadata.kdf_iterations
        )));
    }

    // --- Encrypted payload ---

    let ciphertext = &data[metadata_end..];
    if ciphertext.len() < MIN_PACKED_LEN {
        return Err(corrupt("encrypted payload is truncated"));
    }

    Ok(RawVault {
        version,
        metadata,
        ciphertext: ciphertext.to_vec(),
    })
}

/// Assemble the file bytes for a vault.
pub fn encode_vault(version: u8, metadata: &VaultMetadata, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let metadata_bytes = serde_json::to_vec(metadata)
        .map_err(|e| PmVaultError::SerializationError(format!("metadata: {e}")))?;

    let metadata_len = u32::try_from(metadata_bytes.len()).map_err(|_| {
        PmVaultError::SerializationError(format!(
            "metadata length {} exceeds u32::MAX",
            metadata_bytes.len()
        ))
    })?;
    let len_bytes = match version {
        LEGACY_VERSION => metadata_len.to_le_bytes(),
        CURRENT_VERSION => metadata_len.to_be_bytes(),
        other => {
            return Err(PmVaultError::InvalidInput(format!(
                "cannot write vault format version {other}"
            )));
        }
    };

    let mut buf = Vec::with_capacity(PREFIX_LEN + metadata_bytes.len() + ciphertext.len());
    buf.extend_from_slice(MAGIC); // 4 bytes
    buf.push(version); // 1 byte
    buf.extend_from_slice(&len_bytes); // 4 bytes
    buf.extend_from_slice(&metadata_bytes); // metadata JSON
    buf.extend_from_slice(ciphertext); // nonce | tag | ciphertext
    Ok(buf)
}

/// Write `bytes` to `path` **atomically**.
///
/// 1. Create the parent directory if needed.
/// 2. Write and fsync a temp file in the same directory.
/// 3. Rename the temp file over the target path.
///
/// On failure the temp file is removed and any previous file at `path`
/// is left untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;

    let tmp_path = temp_path_for(parent, path);
    // A leftover temp file from a crash would keep its old mode on truncate.
    let _ = fs::remove_file(&tmp_path);
    let result = write_then_rename(&tmp_path, path, bytes);
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_then_rename(tmp_path: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = create_private(tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    fs::rename(tmp_path, path)?;
    Ok(())
}

/// Create (or truncate) `path` with owner-only permissions from the start.
fn create_private(path: &Path) -> std::io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}

fn temp_path_for(parent: &Path, path: &Path) -> PathBuf {
    parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

fn corrupt(msg: impl Into<String>) -> PmVaultError {
    PmVaultError::CorruptData(msg.into())
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
