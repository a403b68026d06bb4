use crate::core::models::key_id::KeyId;
use crate::core::models::key_record::KeyRecord;
use crate::core::models::outcome::Verification;
use crate::core::services::key_resolver::KeyResolver;
use crate::core::services::key_store::KeyStore;
use crate::core::traits::crypto::SignedContent;

/// Verifies message signatures against the public keys of the store.
pub struct VerificationService<'a, K> {
    pub store: &'a KeyStore<K>,
}

impl<'a, K> VerificationService<'a, K> {
    pub fn new(store: &'a KeyStore<K>) -> Self {
        Self { store }
    }

    /// Classify the signature state of `message`.
    ///
    /// The first valid signature whose key id belongs to a known public
    /// record wins. A backend error while verifying is logged and treated
    /// like a signature that could not be checked.
    pub fn verify<M: SignedContent<K>>(&self, message: &M) -> Verification<'a, K> {
        let store = self.store;

        let signing_ids = message.signing_key_ids();
        if signing_ids.is_empty() {
            return Verification::Unsigned;
        }

        let candidates = KeyResolver::new(store).public_keys_by_signing_ids(&signing_ids);
        if candidates.is_empty() {
            tracing::debug!(signing_ids = %join_ids(&signing_ids), "no public key for signature");
            return Verification::SignedUnverifiable(signing_ids);
        }

        let results = match message.verify(&candidates) {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(error = %e, "signature verification failed");
                return Verification::SignedUnverifiable(signing_ids);
            }
        };

        let verified = results
            .iter()
            .filter(|result| result.valid)
            .find_map(|result| store.find_public_by_hex(result.key_id.to_hex()));

        match verified {
            Some(record) => Verification::SignedVerified(record),
            None => Verification::SignedUnverifiable(signing_ids),
        }
    }

    /// Verify a cleartext-signed message and report through `callback`.
    ///
    /// The callback gets the verifying record, or the signing ids when the
    /// signature could not be verified (`None` for unsigned content).
    /// Returns whether a known key verified the signature.
    pub fn verify_signed_only<M, F>(&self, message: &M, callback: F) -> bool
    where
        M: SignedContent<K>,
        F: FnOnce(Option<&'a KeyRecord<K>>, Option<Vec<KeyId>>),
    {
        let verification = self.verify(message);
        let verified = verification.is_verified();
        let (record, signing_ids) = verification.into_parts();
        callback(record, signing_ids);
        verified
    }
}

pub(crate) fn join_ids(ids: &[KeyId]) -> String {
    ids.iter()
        .map(KeyId::to_hex)
        .collect::<Vec<_>>()
        .join(", ")
}
