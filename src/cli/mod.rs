//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{PmVaultError, Result};
use crate::vault::{VaultRepository, VaultSession};

/// Environment variable holding the master password for scripted use.
pub const PASSWORD_ENV_VAR: &str = "PM_PASSWORD";

/// PmVault CLI: encrypted password vault.
#[derive(Parser)]
#[command(name = "pmvault", about = "Encrypted password vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault file (overrides PM_VAULT and pmconfig.toml)
    #[arg(long, global = true)]
    pub vault: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create the vault if it does not exist yet
    Init,

    /// Add a credential
    Add {
        /// Service name (e.g. example.com)
        #[arg(long)]
        service: String,
        /// Account username
        #[arg(long)]
        username: String,
        /// Account password (omit for interactive prompt)
        #[arg(long)]
        password: Option<String>,
        /// Free-text note
        #[arg(long)]
        notes: Option<String>,
    },

    /// List all credentials
    List {
        /// Print passwords in clear instead of masking them
        #[arg(long)]
        show_passwords: bool,
    },

    /// Remove a credential by id
    Remove {
        /// Credential id (as shown by `list`)
        id: String,
    },

    /// Generate an RSA key pair for export/import
    Genkeys {
        /// Where to write the public key
        public_key: PathBuf,
        /// Where to write the private key
        private_key: PathBuf,
        /// Modulus size in bits (default: rsa_bits from pmconfig.toml)
        #[arg(long)]
        bits: Option<usize>,
        /// Write PEM text instead of binary DER
        #[arg(long)]
        pem: bool,
    },

    /// Encrypt one credential for a recipient's public key
    Export {
        /// Credential id
        id: String,
        /// Recipient's public key file (DER or PEM)
        public_key: PathBuf,
        /// Output envelope file
        output: PathBuf,
    },

    /// Decrypt an exported credential and add it to the vault
    Import {
        /// Your private key file (DER or PEM)
        private_key: PathBuf,
        /// Envelope file produced by `export`
        input: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the master password, trying in order:
/// 1. `PM_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| PmVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation (used by `init`).
///
/// Also respects `PM_PASSWORD` for scripted usage.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Choose master password")
        .with_confirmation(
            "Confirm master password",
            "Passwords do not match, try again",
        )
        .interact()
        .map_err(|e| PmVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV_VAR)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

/// Load `pmconfig.toml` from the working directory.
pub fn load_settings() -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    Settings::load(&cwd)
}

/// Resolve the vault file path: `--vault`, then `PM_VAULT`, then the
/// config file, then the default.
pub fn vault_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match &cli.vault {
        Some(path) => cwd.join(path),
        None => settings.resolve_vault_path(&cwd),
    })
}

/// Build a repository for the resolved vault path.
pub fn repository(cli: &Cli, settings: &Settings) -> Result<VaultRepository> {
    Ok(VaultRepository::with_params(
        vault_path(cli, settings)?,
        settings.kdf_params(),
    ))
}

/// Prompt for the master password and unlock the vault, creating it first
/// if it does not exist yet.
pub fn open_session(cli: &Cli) -> Result<VaultSession> {
    let settings = load_settings()?;
    let repo = repository(cli, &settings)?;
    let password = prompt_password()?;

    if repo.initialize_if_missing(&password)? {
        info!(path = %repo.path().display(), "vault did not exist and was created");
        output::info(&format!("Created new vault at {}", repo.path().display()));
    }
    repo.open(&password)
}
