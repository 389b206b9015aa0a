//! Credential records stored inside a vault.
//!
//! A `Record` serializes as
//! `{id, service, username, password, notes?, createdAtUtc, updatedAtUtc}`.
//! PascalCase keys written by older tools are accepted when reading.
//! The password and notes are wiped from memory when a record is dropped.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A single credential entry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Opaque unique identifier, assigned at creation and never reused.
    #[serde(alias = "Id")]
    pub id: String,

    #[serde(alias = "Service")]
    pub service: String,

    #[serde(alias = "Username")]
    pub username: String,

    #[serde(alias = "Password")]
    pub password: String,

    #[serde(default, alias = "Notes", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(alias = "CreatedAtUtc")]
    pub created_at_utc: DateTime<Utc>,

    #[serde(alias = "UpdatedAtUtc")]
    pub updated_at_utc: DateTime<Utc>,
}

impl Record {
    /// Build a brand-new record with a fresh identifier and timestamps.
    pub fn new(entry: &NewEntry) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            service: entry.service.clone(),
            username: entry.username.clone(),
            password: entry.password.clone(),
            notes: entry.notes.clone(),
            created_at_utc: now,
            updated_at_utc: now,
        }
    }

    /// Copy this record's fields into a new record with a new identity.
    ///
    /// Used for imports: a transferred record is never a continuation of
    /// the record it was exported from.
    pub fn with_fresh_identity(&self) -> Self {
        Self::new(&NewEntry::from(self))
    }

    /// Apply an update, refreshing only the last-update timestamp.
    pub fn apply(&mut self, update: EntryUpdate) {
        let EntryUpdate {
            service,
            username,
            password,
            notes,
        } = update;

        if let Some(service) = service {
            self.service = service;
        }
        if let Some(username) = username {
            self.username = username;
        }
        if let Some(password) = password {
            self.password.zeroize();
            self.password = password;
        }
        if let Some(notes) = notes {
            self.notes.zeroize();
            self.notes = notes;
        }
        self.updated_at_utc = Utc::now();
    }
}

impl Drop for Record {
    fn drop(&mut self) {
        self.password.zeroize();
        self.notes.zeroize();
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("service", &self.service)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("notes", &self.notes.as_ref().map(|_| "<redacted>"))
            .field("created_at_utc", &self.created_at_utc)
            .field("updated_at_utc", &self.updated_at_utc)
            .finish()
    }
}

/// Caller-supplied fields of a record that does not exist yet.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct NewEntry {
    pub service: String,
    pub username: String,
    pub password: String,
    pub notes: Option<String>,
}

impl NewEntry {
    pub fn new(
        service: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            service: service.into(),
            username: username.into(),
            password: password.into(),
            notes,
        }
    }
}

impl From<&Record> for NewEntry {
    fn from(record: &Record) -> Self {
        Self {
            service: record.service.clone(),
            username: record.username.clone(),
            password: record.password.clone(),
            notes: record.notes.clone(),
        }
    }
}

/// Replacement values for an existing record. `None` leaves a field as is;
/// `notes: Some(None)` clears the note.
#[derive(Default)]
pub struct EntryUpdate {
    pub service: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub notes: Option<Option<String>>,
}

/// 32 lowercase hex digits.
fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record::new(&NewEntry::new(
            "example.com",
            "alice",
            "s3cr3t",
            Some("personal".into()),
        ))
    }

    #[test]
    fn new_records_get_unique_ids() {
        let a = sample();
        let b = sample();
        assert_eq!(a.id.len(), 32);
        assert!(a.id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at_utc, a.updated_at_utc);
    }

    #[test]
    fn apply_keeps_identity_and_created_at() {
        let mut record = sample();
        let id = record.id.clone();
        let created = record.created_at_utc;

        record.apply(EntryUpdate {
            password: Some("n3w".into()),
            notes: Some(None),
            ..EntryUpdate::default()
        });

        assert_eq!(record.id, id);
        assert_eq!(record.created_at_utc, created);
        assert!(record.updated_at_utc >= created);
        assert_eq!(record.password, "n3w");
        assert_eq!(record.notes, None);
        assert_eq!(record.service, "example.com");
    }

    #[test]
    fn fresh_identity_copies_fields_only() {
        let original = sample();
        let copy = original.with_fresh_identity();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.service, original.service);
        assert_eq!(copy.username, original.username);
        assert_eq!(copy.password, original.password);
        assert_eq!(copy.notes, original.notes);
    }

    #[test]
    fn json_shape_is_camel_case_and_omits_missing_notes() {
        let record = Record::new(&NewEntry::new("svc", "bob", "pw", None));
        let json = serde_json::to_value(&record).unwrap();
        for key in ["id", "service", "username", "password", "createdAtUtc", "updatedAtUtc"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn reads_pascal_case_records() {
        let json = r#"{
            "Id": "0123456789abcdef0123456789abcdef",
            "Service": "example.com",
            "Username": "alice",
            "Password": "s3cr3t",
            "Notes": null,
            "CreatedAtUtc": "2024-03-01T10:15:30.1234567Z",
            "UpdatedAtUtc": "2024-03-02T08:00:00Z"
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.service, "example.com");
        assert_eq!(record.password, "s3cr3t");
        assert!(record.notes.is_none());
    }

    #[test]
    fn debug_output_redacts_password() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("example.com"));
    }
}
