//! Vault repository: owns the vault file on disk.
//!
//! `VaultRepository` combines the binary format layer with the crypto
//! layer.  `open` hands back a `VaultSession` that carries the decrypted
//! records and the derived key between calls.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto::encryption::{decrypt, encrypt};
use crate::crypto::kdf::{derive_cipher_key, generate_salt, verifier_matches, KdfParams};
use crate::crypto::keys::CipherKey;
use crate::errors::{PmVaultError, Result};

use super::format::{self, VaultMetadata, CURRENT_VERSION, LEGACY_VERSION};
use super::record::Record;
use super::session::VaultSession;

/// One owner's full record set plus the metadata needed to re-derive its
/// key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vault {
    /// Binary format version the vault is written with.
    pub version: u8,
    /// PBKDF2 salt.
    pub salt: Vec<u8>,
    /// Password-verification tag for `salt` under the vault key.
    pub password_verifier: Vec<u8>,
    /// PBKDF2 iteration count.
    pub kdf_iterations: u32,
    /// Records in insertion order.
    pub entries: Vec<Record>,
}

impl Vault {
    /// Recompute the verification tag `key` would produce for this vault.
    pub fn expected_verifier(&self, key: &CipherKey) -> Result<Vec<u8>> {
        match self.version {
            LEGACY_VERSION => key.legacy_verifier(&self.salt),
            _ => key.verifier(&self.salt),
        }
    }

    /// Returns `true` if `key` is the key this vault's verifier was made
    /// with.  Constant-time.
    pub fn accepts_key(&self, key: &CipherKey) -> Result<bool> {
        let expected = self.expected_verifier(key)?;
        Ok(verifier_matches(&expected, &self.password_verifier))
    }

    /// Move a version 1 vault onto the current format.
    pub(crate) fn upgrade(&mut self, key: &CipherKey) -> Result<()> {
        if self.version == LEGACY_VERSION {
            self.password_verifier = key.verifier(&self.salt)?;
            self.version = CURRENT_VERSION;
        }
        Ok(())
    }
}

/// Handle on a vault file path plus the KDF settings for new vaults.
#[derive(Debug, Clone)]
pub struct VaultRepository {
    /// Path to the vault file on disk.
    path: PathBuf,

    /// Parameters used when creating a vault.  Existing vaults always
    /// use the iteration count stored in their own metadata.
    kdf: KdfParams,
}

impl VaultRepository {
    /// Repository for `path` with default KDF parameters.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_params(path, KdfParams::default())
    }

    /// Repository for `path` with explicit KDF parameters.
    pub fn with_params(path: impl Into<PathBuf>, kdf: KdfParams) -> Self {
        Self {
            path: path.into(),
            kdf,
        }
    }

    /// Returns the path to the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if a vault file exists at the path.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Create an empty vault if none exists yet.
    ///
    /// Returns `true` if a vault was created, `false` if one was already
    /// there (in which case the password is not checked).
    pub fn initialize_if_missing(&self, master_password: &str) -> Result<bool> {
        if self.exists() {
            return Ok(false);
        }

        // 1. Fresh salt and key.
        let salt = generate_salt(self.kdf.salt_len)?;
        let key = derive_cipher_key(master_password, &salt, self.kdf.iterations)?;

        // 2. Verifier for the new key.
        let password_verifier = key.verifier(&salt)?;

        // 3. Persist an empty record set.
        let vault = Vault {
            version: CURRENT_VERSION,
            salt,
            password_verifier,
            kdf_iterations: self.kdf.iterations,
            entries: Vec::new(),
        };
        self.save(&vault, &key)?;

        info!(path = %self.path.display(), "created new vault");
        Ok(true)
    }

    /// Open the vault with `master_password` and return a session.
    ///
    /// The structure is validated first, then the password verifier is
    /// checked, and only then is the payload decrypted.
    pub fn open(&self, master_password: &str) -> Result<VaultSession> {
        // 1. Read and structurally validate the file.
        let raw = format::read_vault(&self.path)?;
        let metadata = raw.metadata;

        // 2. Derive the key with the stored salt and iteration count.
        let key = derive_cipher_key(master_password, &metadata.salt, metadata.kdf_iterations)?;

        let mut vault = Vault {
            version: raw.version,
            salt: metadata.salt,
            password_verifier: metadata.password_verifier,
            kdf_iterations: metadata.kdf_iterations,
            entries: Vec::new(),
        };

        // 3. Check the password before touching the ciphertext.
        if !vault.accepts_key(&key)? {
            debug!(path = %self.path.display(), "password verifier mismatch");
            return Err(PmVaultError::AuthenticationFailure);
        }

        // 4. Decrypt and deserialize the records.
        let plaintext = decrypt(key.as_bytes(), &raw.ciphertext, None)?;
        vault.entries = serde_json::from_slice(&plaintext)
            .map_err(|e| PmVaultError::CorruptData(format!("record JSON: {e}")))?;

        if vault.version == LEGACY_VERSION {
            info!(path = %self.path.display(), "upgrading version 1 vault; it is rewritten on next save");
            vault.upgrade(&key)?;
        }

        debug!(
            path = %self.path.display(),
            entries = vault.entries.len(),
            "vault opened"
        );
        Ok(VaultSession::new(self.clone(), vault, key))
    }

    /// Open the vault and return its contents, discarding the key.
    pub fn load(&self, master_password: &str) -> Result<Vault> {
        self.open(master_password)?.into_vault()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Encrypt `vault` under `key` and atomically rewrite the file.
    ///
    /// Refuses to write when `key` does not match the vault's verifier.
    pub fn save(&self, vault: &Vault, key: &CipherKey) -> Result<()> {
        if !vault.accepts_key(key)? {
            return Err(PmVaultError::InvalidInput(
                "password verifier does not match the encryption key".into(),
            ));
        }

        let plaintext = Zeroizing::new(
            serde_json::to_vec(&vault.entries)
                .map_err(|e| PmVaultError::SerializationError(format!("records: {e}")))?,
        );
        let ciphertext = encrypt(key.as_bytes(), &plaintext, None)?;

        let metadata = VaultMetadata {
            version: vault.version.to_string(),
            salt: vault.salt.clone(),
            password_verifier: vault.password_verifier.clone(),
            kdf_iterations: vault.kdf_iterations,
        };
        let bytes = format::encode_vault(vault.version, &metadata, &ciphertext)?;
        format::write_atomic(&self.path, &bytes)?;

        debug!(
            path = %self.path.display(),
            entries = vault.entries.len(),
            "vault saved"
        );
        Ok(())
    }
}
