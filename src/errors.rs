use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in PmVault.
#[derive(Debug, Error)]
pub enum PmVaultError {
    // --- Core taxonomy ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authentication failed: wrong password or key, or the data was tampered with")]
    AuthenticationFailure,

    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("Vault is not loaded")]
    NotReady,

    // --- Vault errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Entry '{0}' not found")]
    EntryNotFound(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Random number generator failed: {0}")]
    RandomFailure(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Coarse classification callers can branch on without matching every
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    AuthenticationFailure,
    CorruptData,
    NotReady,
    Io,
    Other,
}

impl PmVaultError {
    /// Map this error onto its taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::AuthenticationFailure => ErrorKind::AuthenticationFailure,
            Self::CorruptData(_) => ErrorKind::CorruptData,
            Self::NotReady => ErrorKind::NotReady,
            Self::VaultNotFound(_) | Self::Io(_) => ErrorKind::Io,
            Self::EntryNotFound(_)
            | Self::ConfigError(_)
            | Self::SerializationError(_)
            | Self::RandomFailure(_)
            | Self::CommandFailed(_) => ErrorKind::Other,
        }
    }
}

/// Convenience type alias for PmVault results.
pub type Result<T> = std::result::Result<T, PmVaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_maps_taxonomy_variants() {
        assert_eq!(
            PmVaultError::InvalidInput("x".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            PmVaultError::AuthenticationFailure.kind(),
            ErrorKind::AuthenticationFailure
        );
        assert_eq!(
            PmVaultError::CorruptData("x".into()).kind(),
            ErrorKind::CorruptData
        );
        assert_eq!(PmVaultError::NotReady.kind(), ErrorKind::NotReady);
        assert_eq!(
            PmVaultError::VaultNotFound(PathBuf::from("/tmp/x")).kind(),
            ErrorKind::Io
        );
        assert_eq!(
            PmVaultError::EntryNotFound("abc".into()).kind(),
            ErrorKind::Other
        );
    }
}
