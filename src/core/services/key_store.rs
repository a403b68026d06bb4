use secrecy::SecretString;

use crate::core::models::key_record::KeyRecord;
use crate::core::traits::crypto::NativeKey;

/// In-memory collection of parsed key records.
///
/// Records keep keyring order. The public and private partitions are
/// derived views over the same collection, so they are always current.
/// Duplicate ids are not rejected: every lookup returns the first match
/// in store order.
#[derive(Debug)]
pub struct KeyStore<K> {
    records: Vec<KeyRecord<K>>,
}

impl<K> Default for KeyStore<K> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<K> KeyStore<K> {
    pub fn new(records: Vec<KeyRecord<K>>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, public and private, in store order.
    pub fn records(&self) -> &[KeyRecord<K>] {
        &self.records
    }

    pub fn public_keys(&self) -> impl Iterator<Item = &KeyRecord<K>> {
        self.records.iter().filter(|r| !r.is_private)
    }

    pub fn private_keys(&self) -> impl Iterator<Item = &KeyRecord<K>> {
        self.records.iter().filter(|r| r.is_private)
    }

    /// First record in `keys` whose primary id or one of whose subkey
    /// ids equals `hash`. An empty `hash` matches nothing.
    pub fn find_by_hex<'a, I>(keys: I, hash: &str) -> Option<&'a KeyRecord<K>>
    where
        I: IntoIterator<Item = &'a KeyRecord<K>>,
        K: 'a,
    {
        if hash.is_empty() {
            return None;
        }
        keys.into_iter().find(|r| r.matches_hex(hash))
    }

    pub fn find_public_by_hex(&self, hash: &str) -> Option<&KeyRecord<K>> {
        Self::find_by_hex(self.public_keys(), hash)
    }

    pub fn find_private_by_hex(&self, hash: &str) -> Option<&KeyRecord<K>> {
        Self::find_by_hex(self.private_keys(), hash)
    }

    pub fn find_public_by_email(&self, email: &str) -> Option<&KeyRecord<K>> {
        self.public_keys().find(|r| r.has_email(email))
    }

    pub fn find_private_by_email(&self, email: &str) -> Option<&KeyRecord<K>> {
        self.private_keys().find(|r| r.has_email(email))
    }

    pub fn find_all_public_by_email(&self, email: &str) -> Vec<&KeyRecord<K>> {
        self.public_keys().filter(|r| r.has_email(email)).collect()
    }

    pub fn find_all_private_by_email(&self, email: &str) -> Vec<&KeyRecord<K>> {
        self.private_keys().filter(|r| r.has_email(email)).collect()
    }
}

impl<K: NativeKey> KeyStore<K> {
    /// Unlock the first native handle of the first private key for
    /// `email`.
    ///
    /// Returns `None` when no private key matches, the record holds no
    /// handle, or the passphrase is rejected.
    pub fn unlock_private_by_email(&self, email: &str, passphrase: &SecretString) -> Option<&K> {
        let record = self.find_private_by_email(email)?;
        let key = record.native_handles().first()?;

        match key.unlock(passphrase) {
            Ok(()) => Some(key),
            Err(e) => {
                tracing::debug!(key = %record.primary_id, error = %e, "unlock failed");
                None
            }
        }
    }

    /// Unlock the private key of the account owner.
    pub fn unlock_self(&self, account_email: &str, passphrase: &SecretString) -> Option<&K> {
        self.unlock_private_by_email(account_email, passphrase)
    }
}
