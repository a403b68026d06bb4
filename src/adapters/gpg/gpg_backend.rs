use std::path::PathBuf;

use crate::adapters::gpg::colons::{ColonListingParser, ListedKey};
use crate::adapters::gpg::key::GpgKey;
use crate::adapters::gpg::message::{
    CLEARTEXT_HEADER, GpgMessage, GpgSignedText, MESSAGE_HEADER, armored_file, cleartext_body,
};
use crate::adapters::gpg::runner::Gpg;
use crate::adapters::gpg::status;
use crate::config::app_config::GpgSection;
use crate::core::errors::{MailPgpError, Result};
use crate::core::models::key_id::KeyId;
use crate::core::models::key_record::KeyRecord;
use crate::core::traits::crypto::CryptoBackend;
use crate::core::traits::keyring::KeyringLoader;

/// GnuPG backend that shells out to the system `gpg` binary.
///
/// Keys come from the user's gpg keyring; passphrases are passed with
/// loopback pinentry so gpg never opens its own prompt.
pub struct GpgBackend {
    gpg: Gpg,
}

impl GpgBackend {
    /// Create a new backend using the default `gpg` binary.
    pub fn new() -> Self {
        Self {
            gpg: Gpg::default(),
        }
    }

    /// Create a new backend with a custom gpg binary and home directory.
    pub fn with_path(binary: PathBuf, homedir: Option<PathBuf>) -> Self {
        Self {
            gpg: Gpg::new(binary, homedir),
        }
    }

    pub fn from_config(section: &GpgSection) -> Self {
        Self::with_path(section.binary.clone(), section.homedir.clone())
    }

    /// Check if GPG is available on the system.
    pub fn is_available(&self) -> bool {
        self.gpg.is_available()
    }

    /// Fail with `GpgUnavailable` unless gpg can be started.
    pub fn ensure_available(&self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(MailPgpError::GpgUnavailable {
                reason: format!("could not run '{}'", self.gpg.binary().display()),
            })
        }
    }

    fn list(&self, secret: bool) -> Result<Vec<ListedKey>> {
        let command = if secret {
            "--list-secret-keys"
        } else {
            "--list-keys"
        };
        let output = self
            .gpg
            .run(&["--with-colons", "--fixed-list-mode", command], None)?
            .ensure_success()?;

        Ok(ColonListingParser::parse(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    fn to_record(&self, listed: ListedKey, secret: bool) -> KeyRecord<GpgKey> {
        let handle = GpgKey::new(
            self.gpg.clone(),
            KeyId::new(&listed.key_id),
            listed.fingerprint.clone(),
            listed.sub_ids.iter().map(|id| KeyId::new(id)).collect(),
            secret,
        );

        let mut record = KeyRecord::new(listed.key_id, secret, vec![handle])
            .with_sub_ids(listed.sub_ids)
            .with_emails(listed.emails);
        if let Some(user) = listed.user_ids.into_iter().next() {
            record = record.with_user(user);
        }
        if let Some(created) = listed.created {
            record = record.with_created(created);
        }
        record
    }

    /// Run `args` over `armored` and reject input gpg does not recognize.
    fn inspect(&self, armored: &str, args: &[&str]) -> Result<Vec<status::StatusLine>> {
        let file = armored_file(armored)?;
        let path = file.path().to_string_lossy().into_owned();

        let mut full_args = args.to_vec();
        full_args.push(&path);
        let output = self.gpg.run(&full_args, None)?;

        if status::no_data(&output.status) {
            return Err(MailPgpError::MalformedMessage {
                detail: output.stderr.trim().to_string(),
            });
        }
        Ok(output.status)
    }
}

impl Default for GpgBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoBackend for GpgBackend {
    type Key = GpgKey;
    type Message = GpgMessage;
    type Cleartext = GpgSignedText;

    fn parse_armored_message(&self, text: &str) -> Result<GpgMessage> {
        if !text.contains(MESSAGE_HEADER) {
            return Err(MailPgpError::MalformedMessage {
                detail: "no PGP MESSAGE block found".into(),
            });
        }

        // --list-only reports the recipients without decrypting
        let status = self.inspect(text, &["--list-only", "--decrypt"])?;
        let ids = status::encryption_key_ids(&status);
        tracing::debug!(recipients = ids.len(), "parsed encrypted message");

        Ok(GpgMessage::new(self.gpg.clone(), text.to_string(), ids))
    }

    fn parse_armored_cleartext(&self, text: &str) -> Result<GpgSignedText> {
        if !text.contains(CLEARTEXT_HEADER) {
            return Err(MailPgpError::MalformedMessage {
                detail: "no PGP SIGNED MESSAGE block found".into(),
            });
        }
        let body = cleartext_body(text).ok_or_else(|| MailPgpError::MalformedMessage {
            detail: "signed message has no signature block".into(),
        })?;

        let status = self.inspect(text, &["--verify"])?;
        let signatures = status::signatures(&status);
        tracing::debug!(signatures = signatures.len(), "parsed cleartext message");

        Ok(GpgSignedText::new(body, signatures))
    }

    fn name(&self) -> &str {
        "gpg"
    }
}

impl KeyringLoader<GpgKey> for GpgBackend {
    /// Public keys first, then secret keys, each in keyring order.
    fn load_keyring(&self) -> Result<Vec<KeyRecord<GpgKey>>> {
        let public = self.list(false)?;
        let secret = self.list(true)?;
        tracing::debug!(
            public = public.len(),
            secret = secret.len(),
            "loaded gpg keyring"
        );

        Ok(public
            .into_iter()
            .map(|k| self.to_record(k, false))
            .chain(secret.into_iter().map(|k| self.to_record(k, true)))
            .collect())
    }
}
