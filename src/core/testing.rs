//! In-memory collaborators for exercising the core services in tests.

use std::cell::Cell;
use std::sync::OnceLock;

use secrecy::{ExposeSecret, SecretString};

use crate::core::errors::{MailPgpError, Result};
use crate::core::models::key_id::KeyId;
use crate::core::models::key_record::{KeyRecord, KeyState, SignatureResult};
use crate::core::services::key_store::KeyStore;
use crate::core::traits::crypto::{EncryptedMessage, NativeKey, SignedContent};
use crate::core::traits::prompt::PassphrasePrompt;

pub const PASSPHRASE: &str = "correct horse";

#[derive(Debug)]
pub struct MockKey {
    pub id: KeyId,
    pub sub_ids: Vec<KeyId>,
    unlocked: OnceLock<()>,
}

impl MockKey {
    pub fn new(id: &str) -> Self {
        Self {
            id: KeyId::new(id),
            sub_ids: Vec::new(),
            unlocked: OnceLock::new(),
        }
    }
}

impl NativeKey for MockKey {
    fn key_id(&self) -> KeyId {
        self.id.clone()
    }

    fn matches(&self, id: &KeyId) -> bool {
        self.id == *id || self.sub_ids.contains(id)
    }

    fn state(&self) -> KeyState {
        if self.unlocked.get().is_some() {
            KeyState::Unlocked
        } else {
            KeyState::Locked
        }
    }

    fn unlock(&self, passphrase: &SecretString) -> Result<()> {
        if self.unlocked.get().is_some() {
            return Ok(());
        }
        match passphrase.expose_secret() {
            "" => Err(MailPgpError::EmptyPassphrase),
            PASSPHRASE => {
                let _ = self.unlocked.set(());
                Ok(())
            }
            _ => Err(MailPgpError::WrongPassphrase {
                key_id: self.id.to_string(),
            }),
        }
    }
}

/// A record with a single mock handle.
pub fn record(id: &str, is_private: bool, emails: &[&str]) -> KeyRecord<MockKey> {
    KeyRecord::new(id, is_private, vec![MockKey::new(id)]).with_emails(emails.iter().copied())
}

pub fn store(records: Vec<KeyRecord<MockKey>>) -> KeyStore<MockKey> {
    KeyStore::new(records)
}

pub fn ids(hex: &[&str]) -> Vec<KeyId> {
    hex.iter().map(|h| KeyId::new(h)).collect()
}

#[derive(Debug, Clone)]
pub struct MockContent {
    pub signing_ids: Vec<KeyId>,
    pub results: std::result::Result<Vec<SignatureResult>, String>,
    pub text: String,
}

impl MockContent {
    pub fn unsigned(text: &str) -> Self {
        Self {
            signing_ids: Vec::new(),
            results: Ok(Vec::new()),
            text: text.to_string(),
        }
    }

    /// Content signed by `id`, reporting the signature as `valid`.
    pub fn signed_by(text: &str, id: &str, valid: bool) -> Self {
        Self {
            signing_ids: ids(&[id]),
            results: Ok(vec![SignatureResult {
                valid,
                key_id: KeyId::new(id),
            }]),
            text: text.to_string(),
        }
    }
}

impl SignedContent<MockKey> for MockContent {
    fn signing_key_ids(&self) -> Vec<KeyId> {
        self.signing_ids.clone()
    }

    fn verify(&self, _keys: &[&MockKey]) -> Result<Vec<SignatureResult>> {
        self.results
            .clone()
            .map_err(|reason| MailPgpError::GpgFailed { reason })
    }

    fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug)]
pub struct MockMessage {
    pub encryption_ids: Vec<KeyId>,
    /// Plaintext produced on decrypt; `None` makes decryption fail.
    pub plaintext: Option<MockContent>,
}

impl EncryptedMessage<MockKey> for MockMessage {
    type Decrypted = MockContent;

    fn encryption_key_ids(&self) -> Vec<KeyId> {
        self.encryption_ids.clone()
    }

    async fn decrypt(&self, key: &MockKey) -> Result<MockContent> {
        if key.state() == KeyState::Locked {
            return Err(MailPgpError::KeyLocked {
                key_id: key.id.to_string(),
            });
        }
        self.plaintext
            .clone()
            .ok_or(MailPgpError::DecryptionFailed)
    }
}

/// Prompt that unlocks the first candidate with a fixed passphrase,
/// or cancels when no passphrase is set.
#[derive(Default)]
pub struct MockPrompt {
    pub passphrase: Option<String>,
    pub calls: Cell<usize>,
    pub offered: Cell<usize>,
}

impl MockPrompt {
    pub fn answering(passphrase: &str) -> Self {
        Self {
            passphrase: Some(passphrase.to_string()),
            ..Self::default()
        }
    }

    pub fn cancelling() -> Self {
        Self::default()
    }
}

impl PassphrasePrompt<MockKey> for MockPrompt {
    async fn unlock<'a>(&self, candidates: &[&'a KeyRecord<MockKey>]) -> Option<&'a MockKey> {
        self.calls.set(self.calls.get() + 1);
        self.offered.set(candidates.len());

        let passphrase = SecretString::from(self.passphrase.clone()?);
        let key = candidates.first()?.native_handles().first()?;
        key.unlock(&passphrase).ok()?;
        Some(key)
    }
}
