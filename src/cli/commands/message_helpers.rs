use std::io::Read;
use std::path::PathBuf;

use crate::adapters::gpg::gpg_backend::GpgBackend;
use crate::adapters::gpg::key::GpgKey;
use crate::config::app_config::AppConfig;
use crate::core::errors::{MailPgpError, Result};
use crate::core::services::key_store::KeyStore;
use crate::core::traits::crypto::CryptoBackend;
use crate::core::traits::keyring::KeyringLoader;

/// Read an armored message from `file`, or from stdin when omitted.
pub fn read_message(file: Option<&str>) -> Result<String> {
    match file {
        Some(f) => {
            let path = PathBuf::from(f);
            if !path.exists() {
                return Err(MailPgpError::FileNotFound { path });
            }
            Ok(std::fs::read_to_string(&path)?)
        }
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Build the gpg backend from config, failing early when gpg is missing.
pub fn gpg_backend(config: &AppConfig) -> Result<GpgBackend> {
    let backend = GpgBackend::from_config(&config.gpg);
    backend.ensure_available()?;
    tracing::debug!(backend = backend.name(), "crypto backend ready");
    Ok(backend)
}

/// Load the whole gpg keyring into a key store.
pub fn load_store(backend: &GpgBackend) -> Result<KeyStore<GpgKey>> {
    let store = KeyStore::new(backend.load_keyring()?);
    tracing::debug!(keys = store.len(), "key store ready");
    Ok(store)
}

/// Current-thread runtime for the async decrypt flow.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
