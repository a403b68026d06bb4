use chrono::{DateTime, Utc};

use crate::core::models::key_id::KeyId;

/// A parsed PGP key known to the store.
///
/// Records are built once when the keyring is loaded and never change
/// afterwards, except for the unlock state held inside their native
/// handles.
#[derive(Debug)]
pub struct KeyRecord<K> {
    pub primary_id: String,
    pub sub_ids: Vec<String>,
    pub emails: Vec<String>,
    /// First user id of the key, used for display.
    pub user: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub is_private: bool,
    native_handles: Vec<K>,
}

impl<K> KeyRecord<K> {
    /// Create a record that owns the given native key handles.
    pub fn new(primary_id: impl Into<String>, is_private: bool, native_handles: Vec<K>) -> Self {
        Self {
            primary_id: primary_id.into(),
            sub_ids: Vec::new(),
            emails: Vec::new(),
            user: None,
            created: None,
            is_private,
            native_handles,
        }
    }

    pub fn with_sub_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in ids {
            let id = id.into();
            if !self.sub_ids.contains(&id) {
                self.sub_ids.push(id);
            }
        }
        self
    }

    pub fn with_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for email in emails {
            let email = email.into();
            if !self.emails.contains(&email) {
                self.emails.push(email);
            }
        }
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// The crypto-library key objects owned by this record.
    pub fn native_handles(&self) -> &[K] {
        &self.native_handles
    }

    /// Whether `hash` is the primary id or one of the subkey ids.
    /// An empty `hash` never matches.
    pub fn matches_hex(&self, hash: &str) -> bool {
        !hash.is_empty() && (self.primary_id == hash || self.sub_ids.iter().any(|id| id == hash))
    }

    pub fn has_email(&self, email: &str) -> bool {
        self.emails.iter().any(|e| e == email)
    }

    /// Display label in the form `user (id)`.
    pub fn label(&self) -> String {
        match &self.user {
            Some(user) => format!("{user} ({})", self.primary_id),
            None => self.primary_id.clone(),
        }
    }
}

/// Result of verifying one signature packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureResult {
    pub valid: bool,
    pub key_id: KeyId,
}

/// Unlock state of a private native key.
///
/// A key moves from `Locked` to `Unlocked` once, when a correct
/// passphrase is supplied, and stays unlocked for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Locked,
    Unlocked,
}
