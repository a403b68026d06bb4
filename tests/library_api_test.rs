use std::sync::OnceLock;

use mailpgp::core::errors::{MailPgpError, Result};
use mailpgp::core::models::key_id::KeyId;
use mailpgp::core::models::key_record::{KeyRecord, KeyState, SignatureResult};
use mailpgp::core::services::decryption::DecryptionService;
use mailpgp::core::services::key_resolver::KeyResolver;
use mailpgp::core::services::key_store::KeyStore;
use mailpgp::core::traits::crypto::{EncryptedMessage, NativeKey, SignedContent};
use mailpgp::core::traits::prompt::PassphrasePrompt;
use secrecy::{ExposeSecret, SecretString};

const PASSPHRASE: &str = "open sesame";

struct Key {
    id: KeyId,
    unlocked: OnceLock<()>,
}

impl NativeKey for Key {
    fn key_id(&self) -> KeyId {
        self.id.clone()
    }

    fn matches(&self, id: &KeyId) -> bool {
        self.id == *id
    }

    fn state(&self) -> KeyState {
        if self.unlocked.get().is_some() {
            KeyState::Unlocked
        } else {
            KeyState::Locked
        }
    }

    fn unlock(&self, passphrase: &SecretString) -> Result<()> {
        if self.unlocked.get().is_some() || passphrase.expose_secret() == PASSPHRASE {
            let _ = self.unlocked.set(());
            Ok(())
        } else {
            Err(MailPgpError::WrongPassphrase {
                key_id: self.id.to_string(),
            })
        }
    }
}

struct Plaintext {
    signer: Option<KeyId>,
}

impl SignedContent<Key> for Plaintext {
    fn signing_key_ids(&self) -> Vec<KeyId> {
        self.signer.iter().cloned().collect()
    }

    fn verify(&self, keys: &[&Key]) -> Result<Vec<SignatureResult>> {
        Ok(self
            .signer
            .iter()
            .map(|id| SignatureResult {
                valid: keys.iter().any(|k| k.matches(id)),
                key_id: id.clone(),
            })
            .collect())
    }

    fn text(&self) -> &str {
        "hello"
    }
}

struct Letter {
    to: Vec<KeyId>,
    signer: Option<KeyId>,
}

impl EncryptedMessage<Key> for Letter {
    type Decrypted = Plaintext;

    fn encryption_key_ids(&self) -> Vec<KeyId> {
        self.to.clone()
    }

    async fn decrypt(&self, key: &Key) -> Result<Plaintext> {
        if key.state() == KeyState::Locked {
            return Err(MailPgpError::KeyLocked {
                key_id: key.id.to_string(),
            });
        }
        Ok(Plaintext {
            signer: self.signer.clone(),
        })
    }
}

/// Unlocks the first candidate with a fixed answer.
struct Answer(&'static str);

impl PassphrasePrompt<Key> for Answer {
    async fn unlock<'a>(&self, candidates: &[&'a KeyRecord<Key>]) -> Option<&'a Key> {
        let key = candidates.first()?.native_handles().first()?;
        key.unlock(&SecretString::from(self.0.to_string())).ok()?;
        Some(key)
    }
}

fn record(id: &str, private: bool, email: &str) -> KeyRecord<Key> {
    let key = Key {
        id: KeyId::new(id),
        unlocked: OnceLock::new(),
    };
    KeyRecord::new(id, private, vec![key]).with_emails([email])
}

fn sample() -> KeyStore<Key> {
    KeyStore::new(vec![
        record("AAAA", true, "alice@example.com"),
        record("AAAA", false, "alice@example.com"),
        record("BBBB", false, "bob@example.com"),
    ])
}

fn letter(to: &str, signer: Option<&str>) -> Letter {
    Letter {
        to: vec![KeyId::new(to)],
        signer: signer.map(KeyId::new),
    }
}

#[test]
fn store_and_resolver_lookups() {
    let store = sample();
    assert!(!store.is_empty());
    assert!(KeyStore::<Key>::default().is_empty());
    assert_eq!(
        store.find_public_by_email("bob@example.com").unwrap().primary_id,
        "BBBB"
    );

    let resolver = KeyResolver::new(&store);
    let bob = resolver.public_keys_by_email("bob@example.com");
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].key_id(), KeyId::new("BBBB"));

    let recipients = vec!["alice@example.com".to_string()];
    let keys = resolver.private_keys_by_encryption_ids(&[KeyId::new("FFFF")], &recipients);
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].key_id(), KeyId::new("AAAA"));
}

#[tokio::test]
async fn decrypt_with_reports_flattened_parts_once() {
    let store = sample();
    let service = DecryptionService::new(&store, Answer(PASSPHRASE));
    let recipients = vec!["alice@example.com".to_string()];

    let mut calls = 0;
    service
        .decrypt_with(
            &letter("FFFF", Some("BBBB")),
            &recipients,
            |key, decrypted, public, signing_ids| {
                calls += 1;
                let key = key.unwrap();
                assert_eq!(key.primary_id, "AAAA");
                assert!(key.is_private);
                assert_eq!(decrypted.unwrap().text(), "hello");
                assert_eq!(public.unwrap().primary_id, "BBBB");
                assert!(signing_ids.is_none());
            },
        )
        .await;
    assert_eq!(calls, 1);
}

#[tokio::test]
async fn decrypt_with_unknown_signer_reports_ids() {
    let store = sample();
    let service = DecryptionService::new(&store, Answer(PASSPHRASE));

    service
        .decrypt_with(
            &letter("AAAA", Some("CCCC")),
            &[],
            |key, decrypted, public, signing_ids| {
                assert!(key.is_some() && decrypted.is_some());
                assert!(public.is_none());
                assert_eq!(signing_ids, Some(vec![KeyId::new("CCCC")]));
            },
        )
        .await;
}

#[tokio::test]
async fn decrypt_with_wrong_passphrase_collapses_to_nothing() {
    let store = sample();
    let service = DecryptionService::new(&store, Answer("guess"));

    let mut calls = 0;
    service
        .decrypt_with(
            &letter("AAAA", Some("BBBB")),
            &[],
            |key, decrypted, public, signing_ids| {
                calls += 1;
                assert!(key.is_none());
                assert!(decrypted.is_none());
                assert!(public.is_none());
                assert!(signing_ids.is_none());
            },
        )
        .await;
    assert_eq!(calls, 1);

    let outcome = service.decrypt(&letter("AAAA", None), &[]).await;
    assert!(!outcome.is_decrypted());
}
