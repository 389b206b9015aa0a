use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{
    KdfParams, DEFAULT_ITERATIONS, DEFAULT_SALT_LEN, MAX_ITERATIONS, MIN_ITERATIONS, MIN_SALT_LEN,
};
use crate::crypto::rsa_keys::{DEFAULT_KEY_BITS, MAX_KEY_BITS, MIN_KEY_BITS};
use crate::errors::{PmVaultError, Result};

/// Environment variable that overrides `vault_path`.
pub const VAULT_ENV_VAR: &str = "PM_VAULT";

/// Program configuration, loaded from `pmconfig.toml`.
///
/// Every field has a default, so no config file is needed at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Vault file location; relative paths resolve against the working
    /// directory.
    #[serde(default = "default_vault_path")]
    pub vault_path: String,

    /// PBKDF2 iteration count for newly created vaults.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Salt length in bytes for newly created vaults.
    #[serde(default = "default_salt_length")]
    pub salt_length: usize,

    /// Modulus size for `genkeys` when `--bits` is not given.
    #[serde(default = "default_rsa_bits")]
    pub rsa_bits: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_path() -> String {
    ".vault".to_string()
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_salt_length() -> usize {
    DEFAULT_SALT_LEN
}

fn default_rsa_bits() -> usize {
    DEFAULT_KEY_BITS
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_path: default_vault_path(),
            kdf_iterations: default_kdf_iterations(),
            salt_length: default_salt_length(),
            rsa_bits: default_rsa_bits(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    pub const FILE_NAME: &'static str = "pmconfig.toml";

    /// Load `<dir>/pmconfig.toml` and apply `PM_VAULT`.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut settings = Self::load_file(dir)?;
        settings.apply_vault_override(std::env::var(VAULT_ENV_VAR).ok());
        Ok(settings)
    }

    /// Load `<dir>/pmconfig.toml` without looking at the environment.
    ///
    /// A missing file yields the defaults.  A file that does not parse, or
    /// holds values the crypto layer would reject, is a `ConfigError`.
    pub fn load_file(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            PmVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;
        settings.validate()?;

        Ok(settings)
    }

    /// Replace `vault_path` with a non-blank override.
    pub fn apply_vault_override(&mut self, vault_path: Option<String>) {
        if let Some(path) = vault_path.filter(|p| !p.trim().is_empty()) {
            self.vault_path = path;
        }
    }

    /// The vault file path, resolved against `base_dir` when relative.
    pub fn resolve_vault_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.vault_path)
    }

    /// Convert the KDF settings into crypto-layer params.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            iterations: self.kdf_iterations,
            salt_len: self.salt_length,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.vault_path.trim().is_empty() {
            return Err(PmVaultError::ConfigError(
                "vault_path must not be empty".into(),
            ));
        }
        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&self.kdf_iterations) {
            return Err(PmVaultError::ConfigError(format!(
                "kdf_iterations must be between {MIN_ITERATIONS} and {MAX_ITERATIONS}"
            )));
        }
        if self.salt_length < MIN_SALT_LEN {
            return Err(PmVaultError::ConfigError(format!(
                "salt_length must be at least {MIN_SALT_LEN}"
            )));
        }
        if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&self.rsa_bits) {
            return Err(PmVaultError::ConfigError(format!(
                "rsa_bits must be between {MIN_KEY_BITS} and {MAX_KEY_BITS}"
            )));
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
