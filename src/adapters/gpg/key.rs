use std::io::Write;
use std::sync::OnceLock;

use secrecy::{ExposeSecret, SecretString};

use crate::adapters::gpg::runner::Gpg;
use crate::core::errors::{MailPgpError, Result};
use crate::core::models::key_id::KeyId;
use crate::core::models::key_record::KeyState;
use crate::core::traits::crypto::NativeKey;

/// A key in the gpg keyring.
///
/// Secret keys start locked. Unlocking checks the passphrase against gpg
/// and keeps it for later decrypt calls; it cannot be undone.
#[derive(Debug)]
pub struct GpgKey {
    gpg: Gpg,
    key_id: KeyId,
    fingerprint: Option<String>,
    subkey_ids: Vec<KeyId>,
    secret: bool,
    passphrase: OnceLock<SecretString>,
}

impl GpgKey {
    pub fn new(
        gpg: Gpg,
        key_id: KeyId,
        fingerprint: Option<String>,
        subkey_ids: Vec<KeyId>,
        secret: bool,
    ) -> Self {
        Self {
            gpg,
            key_id,
            fingerprint,
            subkey_ids,
            secret,
            passphrase: OnceLock::new(),
        }
    }

    /// Identifier handed to gpg's `--local-user`/`--try-secret-key`.
    pub fn selector(&self) -> String {
        self.fingerprint
            .clone()
            .unwrap_or_else(|| self.key_id.to_string())
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// The passphrase that unlocked this key, if it is unlocked.
    pub(crate) fn passphrase(&self) -> Option<&SecretString> {
        self.passphrase.get()
    }

    /// Ask gpg to sign an empty payload with this key, which only succeeds
    /// when `passphrase` is correct.
    fn check_passphrase(&self, passphrase: &SecretString) -> Result<()> {
        let mut payload = tempfile::NamedTempFile::new()?;
        payload.flush()?;
        let path = payload.path().to_string_lossy().into_owned();
        let selector = self.selector();

        let stdin = format!("{}\n", passphrase.expose_secret());
        let output = self.gpg.run(
            &[
                "--yes",
                "--pinentry-mode",
                "loopback",
                "--passphrase-fd",
                "0",
                "--local-user",
                &selector,
                "--output",
                "-",
                "--sign",
                &path,
            ],
            Some(stdin.as_bytes()),
        )?;

        if output.success {
            Ok(())
        } else {
            tracing::debug!(key = %self.key_id, stderr = %output.stderr.trim(), "passphrase rejected");
            Err(MailPgpError::WrongPassphrase {
                key_id: self.key_id.to_string(),
            })
        }
    }
}

impl NativeKey for GpgKey {
    fn key_id(&self) -> KeyId {
        self.key_id.clone()
    }

    fn matches(&self, id: &KeyId) -> bool {
        self.key_id == *id || self.subkey_ids.contains(id)
    }

    fn state(&self) -> KeyState {
        if self.passphrase.get().is_some() {
            KeyState::Unlocked
        } else {
            KeyState::Locked
        }
    }

    fn unlock(&self, passphrase: &SecretString) -> Result<()> {
        if self.passphrase.get().is_some() {
            return Ok(());
        }
        if !self.secret {
            return Err(MailPgpError::GpgFailed {
                reason: format!("{} is a public key and cannot be unlocked", self.key_id),
            });
        }
        if passphrase.expose_secret().is_empty() {
            return Err(MailPgpError::EmptyPassphrase);
        }

        self.check_passphrase(passphrase)?;
        let _ = self
            .passphrase
            .set(SecretString::from(passphrase.expose_secret().to_string()));
        tracing::debug!(key = %self.key_id, "key unlocked");
        Ok(())
    }
}
