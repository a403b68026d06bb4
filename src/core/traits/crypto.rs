use secrecy::SecretString;

use crate::core::errors::Result;
use crate::core::models::key_id::KeyId;
use crate::core::models::key_record::{KeyState, SignatureResult};

/// Port for a crypto-library key object.
///
/// Implementations live in `adapters` (e.g. `GpgKey`). Handles are owned
/// by their `KeyRecord`; the core only ever borrows them.
pub trait NativeKey {
    /// Primary key id of this key.
    fn key_id(&self) -> KeyId;

    /// Whether `id` names the primary key or one of its subkeys.
    fn matches(&self, id: &KeyId) -> bool;

    /// Current unlock state.
    fn state(&self) -> KeyState;

    /// Unlock the key in place with `passphrase`.
    ///
    /// Fails on an empty or wrong passphrase and leaves the key locked.
    /// Once unlocked, further calls succeed without touching the key.
    fn unlock(&self, passphrase: &SecretString) -> Result<()>;
}

/// Port for content that may carry signatures: a cleartext-signed
/// message or the plaintext of a decrypted message.
pub trait SignedContent<K> {
    /// Key ids of every signature on the content, empty when unsigned.
    fn signing_key_ids(&self) -> Vec<KeyId>;

    /// Check the signatures against `keys`.
    fn verify(&self, keys: &[&K]) -> Result<Vec<SignatureResult>>;

    /// The readable text of the content.
    fn text(&self) -> &str;
}

/// Port for an armored encrypted message.
#[allow(async_fn_in_trait)]
pub trait EncryptedMessage<K> {
    type Decrypted: SignedContent<K>;

    /// Key ids the message was encrypted to.
    fn encryption_key_ids(&self) -> Vec<KeyId>;

    /// Decrypt with an unlocked private key.
    async fn decrypt(&self, key: &K) -> Result<Self::Decrypted>;
}

/// Port for the armored-text parsers of a crypto library.
pub trait CryptoBackend {
    type Key: NativeKey;
    type Message: EncryptedMessage<Self::Key>;
    type Cleartext: SignedContent<Self::Key>;

    /// Parse an armored `PGP MESSAGE` block.
    fn parse_armored_message(&self, text: &str) -> Result<Self::Message>;

    /// Parse an armored `PGP SIGNED MESSAGE` block.
    fn parse_armored_cleartext(&self, text: &str) -> Result<Self::Cleartext>;

    /// Human-readable name of this backend (e.g. "gpg").
    fn name(&self) -> &str;
}
