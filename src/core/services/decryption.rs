use crate::core::models::key_id::KeyId;
use crate::core::models::key_record::KeyRecord;
use crate::core::models::outcome::{DecryptFailure, DecryptOutcome};
use crate::core::services::key_resolver::KeyResolver;
use crate::core::services::key_store::KeyStore;
use crate::core::services::verification::VerificationService;
use crate::core::traits::crypto::{EncryptedMessage, NativeKey};
use crate::core::traits::prompt::PassphrasePrompt;

/// Drives one encrypted message through key resolution, passphrase
/// entry, decryption and signature verification.
///
/// Every stage reports failure through the returned `DecryptOutcome`;
/// this service never returns an error. Two flows must not run against
/// the same private key at once, since unlocking mutates the key.
pub struct DecryptionService<'a, K, P> {
    pub store: &'a KeyStore<K>,
    pub prompt: P,
}

impl<'a, K, P> DecryptionService<'a, K, P>
where
    K: NativeKey,
    P: PassphrasePrompt<K>,
{
    pub fn new(store: &'a KeyStore<K>, prompt: P) -> Self {
        Self { store, prompt }
    }

    /// Decrypt `message`, falling back to `recipients` emails when none
    /// of its encryption key ids is a known private key.
    pub async fn decrypt<M>(
        &self,
        message: &M,
        recipients: &[String],
    ) -> DecryptOutcome<'a, K, M::Decrypted>
    where
        M: EncryptedMessage<K>,
    {
        let store = self.store;

        // Resolving keys
        let candidates = KeyResolver::new(store)
            .private_records_by_encryption_ids(&message.encryption_key_ids(), recipients);
        if candidates.is_empty() {
            return fail(DecryptFailure::NoCandidateKey);
        }

        // Awaiting passphrase
        let Some(key) = self.prompt.unlock(&candidates).await else {
            return fail(DecryptFailure::PromptCancelled);
        };

        // Decrypting
        let decrypted = match message.decrypt(key).await {
            Ok(decrypted) => decrypted,
            Err(e) => {
                tracing::warn!(key = %key.key_id(), error = %e, "decryption rejected");
                return fail(DecryptFailure::DecryptionFailure);
            }
        };

        // Decrypted: report which identity owns the key
        let owner = store.find_private_by_hex(key.key_id().to_hex());
        if owner.is_none() {
            tracing::warn!(key = %key.key_id(), "decrypting key has no private record");
        }

        // Verifying
        let verification = VerificationService::new(store).verify(&decrypted);
        tracing::debug!(verified = verification.is_verified(), "message decrypted");

        DecryptOutcome::Decrypted {
            key: owner,
            message: decrypted,
            verification,
        }
    }

    /// Run `decrypt` and hand the flattened result to `callback`, which is
    /// called exactly once with `(private record, decrypted message,
    /// verifying public record, unverified signing ids)`.
    pub async fn decrypt_with<M, F>(&self, message: &M, recipients: &[String], callback: F)
    where
        M: EncryptedMessage<K>,
        F: FnOnce(
            Option<&'a KeyRecord<K>>,
            Option<M::Decrypted>,
            Option<&'a KeyRecord<K>>,
            Option<Vec<KeyId>>,
        ),
    {
        let (key, decrypted, public, signing_ids) =
            self.decrypt(message, recipients).await.into_parts();
        callback(key, decrypted, public, signing_ids);
    }
}

fn fail<'a, K, D>(failure: DecryptFailure) -> DecryptOutcome<'a, K, D> {
    tracing::debug!(%failure, "decrypt flow stopped");
    DecryptOutcome::Failed(failure)
}
