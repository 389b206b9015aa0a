//! An unlocked vault: decrypted records plus the key that protects them.
//!
//! Every mutation re-encrypts and rewrites the whole file.  If the write
//! fails the in-memory record set is rolled back, so the session never
//! drifts from what is on disk.

use std::path::Path;

use crate::crypto::keys::CipherKey;
use crate::errors::{PmVaultError, Result};

use super::record::{EntryUpdate, NewEntry, Record};
use super::store::{Vault, VaultRepository};

struct Unlocked {
    vault: Vault,
    key: CipherKey,
}

/// Handle returned by `VaultRepository::open`.
///
/// Dropping the session, or calling `lock`, wipes the key and records;
/// after `lock` every operation fails with `NotReady`.
pub struct VaultSession {
    repository: VaultRepository,
    state: Option<Unlocked>,
}

impl VaultSession {
    pub(crate) fn new(repository: VaultRepository, vault: Vault, key: CipherKey) -> Self {
        Self {
            repository,
            state: Some(Unlocked { vault, key }),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the vault file.
    pub fn path(&self) -> &Path {
        self.repository.path()
    }

    /// Returns `true` until `lock` is called.
    pub fn is_unlocked(&self) -> bool {
        self.state.is_some()
    }

    /// The decrypted vault.
    pub fn vault(&self) -> Result<&Vault> {
        Ok(&self.unlocked()?.vault)
    }

    /// All records, in insertion order.
    pub fn entries(&self) -> Result<&[Record]> {
        Ok(&self.unlocked()?.vault.entries)
    }

    /// Look up a record by identifier.
    pub fn find(&self, id: &str) -> Result<Option<&Record>> {
        Ok(self.entries()?.iter().find(|r| r.id == id))
    }

    /// Number of records.
    pub fn len(&self) -> Result<usize> {
        Ok(self.entries()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Add a new record and persist the vault.
    pub fn add_entry(&mut self, entry: &NewEntry) -> Result<Record> {
        let state = self.state.as_mut().ok_or(PmVaultError::NotReady)?;

        let record = Record::new(entry);
        state.vault.entries.push(record.clone());

        if let Err(e) = self.repository.save(&state.vault, &state.key) {
            state.vault.entries.pop();
            return Err(e);
        }
        Ok(record)
    }

    /// Add an imported record as a brand-new entry.
    pub fn import_entry(&mut self, record: &Record) -> Result<Record> {
        self.add_entry(&NewEntry::from(record))
    }

    /// Change fields of an existing record and persist the vault.
    pub fn update_entry(&mut self, id: &str, update: EntryUpdate) -> Result<Record> {
        let state = self.state.as_mut().ok_or(PmVaultError::NotReady)?;

        let index = state
            .vault
            .entries
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| PmVaultError::EntryNotFound(id.to_string()))?;

        let previous = state.vault.entries[index].clone();
        state.vault.entries[index].apply(update);

        if let Err(e) = self.repository.save(&state.vault, &state.key) {
            state.vault.entries[index] = previous;
            return Err(e);
        }
        Ok(state.vault.entries[index].clone())
    }

    /// Remove a record and persist the vault.
    ///
    /// Returns `false` (and writes nothing) if no record has that id.
    pub fn remove_entry(&mut self, id: &str) -> Result<bool> {
        let state = self.state.as_mut().ok_or(PmVaultError::NotReady)?;

        let Some(index) = state.vault.entries.iter().position(|r| r.id == id) else {
            return Ok(false);
        };
        let removed = state.vault.entries.remove(index);

        if let Err(e) = self.repository.save(&state.vault, &state.key) {
            state.vault.entries.insert(index, removed);
            return Err(e);
        }
        Ok(true)
    }

    /// Rewrite the vault file from the in-memory state.
    pub fn save(&self) -> Result<()> {
        let state = self.unlocked()?;
        self.repository.save(&state.vault, &state.key)
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Wipe the key and records from memory.
    pub fn lock(&mut self) {
        self.state = None;
    }

    /// Consume the session, keeping the vault and wiping the key.
    pub fn into_vault(mut self) -> Result<Vault> {
        self.state
            .take()
            .map(|state| state.vault)
            .ok_or(PmVaultError::NotReady)
    }

    fn unlocked(&self) -> Result<&Unlocked> {
        self.state.as_ref().ok_or(PmVaultError::NotReady)
    }
}
