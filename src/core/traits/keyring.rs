use crate::core::errors::Result;
use crate::core::models::key_record::KeyRecord;

/// Port for loading the persisted keyring into key records.
pub trait KeyringLoader<K> {
    /// Load every public and private key, in keyring order.
    fn load_keyring(&self) -> Result<Vec<KeyRecord<K>>>;
}
