use crate::core::models::key_id::KeyId;
use crate::core::models::key_record::KeyRecord;

/// Outcome of checking a message's signature against known public keys.
#[derive(Debug)]
pub enum Verification<'a, K> {
    /// The message carries no signature at all.
    Unsigned,
    /// Signed, but no known public key produced a valid signature.
    SignedUnverifiable(Vec<KeyId>),
    /// A valid signature from this public record.
    SignedVerified(&'a KeyRecord<K>),
}

impl<'a, K> Verification<'a, K> {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::SignedVerified(_))
    }

    /// The verifying record, if any.
    pub fn verified_key(&self) -> Option<&'a KeyRecord<K>> {
        match self {
            Self::SignedVerified(record) => Some(record),
            _ => None,
        }
    }

    /// Split into `(verified record, signing ids)`.
    ///
    /// Exactly one side is set for signed messages; both are `None`
    /// for unsigned ones.
    pub fn into_parts(self) -> (Option<&'a KeyRecord<K>>, Option<Vec<KeyId>>) {
        match self {
            Self::Unsigned => (None, None),
            Self::SignedUnverifiable(ids) => (None, Some(ids)),
            Self::SignedVerified(record) => (Some(record), None),
        }
    }
}

/// Why a decrypt flow ended without plaintext.
///
/// Callers of the collapsed form (`DecryptOutcome::into_parts`) cannot
/// tell these apart; the variant is kept for logs and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptFailure {
    /// No private key matched by key id or recipient email.
    NoCandidateKey,
    /// The user declined or failed passphrase entry.
    PromptCancelled,
    /// The crypto backend rejected the decrypt call.
    DecryptionFailure,
}

impl std::fmt::Display for DecryptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NoCandidateKey => "no candidate private key",
            Self::PromptCancelled => "passphrase prompt cancelled",
            Self::DecryptionFailure => "decryption failed",
        };
        f.write_str(s)
    }
}

/// Completion value of one decrypt flow.
#[derive(Debug)]
pub enum DecryptOutcome<'a, K, D> {
    Failed(DecryptFailure),
    Decrypted {
        /// Private record that decrypted the message, when it is still known to the store.
        key: Option<&'a KeyRecord<K>>,
        message: D,
        verification: Verification<'a, K>,
    },
}

/// Flattened decrypt result: `(private record, decrypted message,
/// verifying public record, unverified signing ids)`.
pub type DecryptParts<'a, K, D> = (
    Option<&'a KeyRecord<K>>,
    Option<D>,
    Option<&'a KeyRecord<K>>,
    Option<Vec<KeyId>>,
);

impl<'a, K, D> DecryptOutcome<'a, K, D> {
    pub fn is_decrypted(&self) -> bool {
        matches!(self, Self::Decrypted { .. })
    }

    pub fn into_parts(self) -> DecryptParts<'a, K, D> {
        match self {
            Self::Failed(_) => (None, None, None, None),
            Self::Decrypted {
                key,
                message,
                verification,
            } => {
                let (public, signing_ids) = verification.into_parts();
                (key, Some(message), public, signing_ids)
            }
        }
    }
}
