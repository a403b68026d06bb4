use std::collections::HashSet;

use crate::core::models::key_id::KeyId;
use crate::core::models::key_record::KeyRecord;
use crate::core::services::key_store::KeyStore;

/// Builds candidate key lists for a message's signing or encryption key
/// ids, falling back to recipient emails for decryption.
pub struct KeyResolver<'a, K> {
    pub store: &'a KeyStore<K>,
}

impl<'a, K> KeyResolver<'a, K> {
    pub fn new(store: &'a KeyStore<K>) -> Self {
        Self { store }
    }

    /// Native handles of the public keys behind `ids`.
    ///
    /// Ids without a matching public record are skipped. Handles come out
    /// in input-id order, grouped by record.
    pub fn public_keys_by_signing_ids(&self, ids: &[KeyId]) -> Vec<&'a K> {
        let store = self.store;
        let mut keys = Vec::new();
        for id in ids {
            if let Some(record) = store.find_public_by_hex(id.to_hex()) {
                keys.extend(record.native_handles().iter());
            }
        }
        keys
    }

    /// Native handles of every public key for `email`.
    pub fn public_keys_by_email(&self, email: &str) -> Vec<&'a K> {
        let store = self.store;
        flatten_handles(&store.find_all_public_by_email(email))
    }

    /// Private records able to decrypt a message sent to `ids`.
    ///
    /// Phase one looks each id up in the private partition. Only when that
    /// finds nothing and `recipients` is non-empty does phase two collect
    /// every private key of every recipient email, deduplicated by primary
    /// id. The phases never merge.
    pub fn private_records_by_encryption_ids(
        &self,
        ids: &[KeyId],
        recipients: &[String],
    ) -> Vec<&'a KeyRecord<K>> {
        let store = self.store;

        let by_id: Vec<_> = ids
            .iter()
            .filter_map(|id| store.find_private_by_hex(id.to_hex()))
            .collect();
        tracing::debug!(
            ids = ids.len(),
            matched = by_id.len(),
            "private keys by encryption id"
        );

        if !by_id.is_empty() || recipients.is_empty() {
            return by_id;
        }

        let mut seen = HashSet::new();
        let mut by_email = Vec::new();
        for email in recipients.iter().filter(|e| !e.is_empty()) {
            for record in store.find_all_private_by_email(email) {
                if seen.insert(record.primary_id.as_str()) {
                    by_email.push(record);
                }
            }
        }
        tracing::debug!(
            recipients = recipients.len(),
            matched = by_email.len(),
            "private keys by recipient email"
        );

        by_email
    }

    /// Native handles of `private_records_by_encryption_ids`, flattened in
    /// record order.
    pub fn private_keys_by_encryption_ids(
        &self,
        ids: &[KeyId],
        recipients: &[String],
    ) -> Vec<&'a K> {
        flatten_handles(&self.private_records_by_encryption_ids(ids, recipients))
    }
}

fn flatten_handles<'a, K>(records: &[&'a KeyRecord<K>]) -> Vec<&'a K> {
    records
        .iter()
        .flat_map(|record| record.native_handles())
        .collect()
}
