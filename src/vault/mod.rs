//! Vault module: encrypted credential storage.
//!
//! This module provides:
//! - `Record`, `NewEntry` and `EntryUpdate` types (`record`)
//! - Binary vault file format (`format`)
//! - `VaultRepository` for creating, opening and saving vaults (`store`)
//! - `VaultSession`, the unlocked-vault handle (`session`)

pub mod format;
pub mod record;
pub mod session;
pub mod store;

// Re-export the most commonly used items.
pub use format::{VaultMetadata, CURRENT_VERSION, LEGACY_VERSION};
pub use record::{EntryUpdate, NewEntry, Record};
pub use session::VaultSession;
pub use store::{Vault, VaultRepository};
