use std::io::Write;

use secrecy::ExposeSecret;

use crate::adapters::gpg::key::GpgKey;
use crate::adapters::gpg::runner::Gpg;
use crate::adapters::gpg::status;
use crate::core::errors::{MailPgpError, Result};
use crate::core::models::key_id::KeyId;
use crate::core::models::key_record::SignatureResult;
use crate::core::traits::crypto::{EncryptedMessage, NativeKey, SignedContent};

pub const MESSAGE_HEADER: &str = "-----BEGIN PGP MESSAGE-----";
pub const CLEARTEXT_HEADER: &str = "-----BEGIN PGP SIGNED MESSAGE-----";
const SIGNATURE_HEADER: &str = "-----BEGIN PGP SIGNATURE-----";

/// Write armored text to a temp file gpg can read from.
pub(crate) fn armored_file(armored: &str) -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(armored.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// An armored `PGP MESSAGE` read through gpg.
#[derive(Debug)]
pub struct GpgMessage {
    gpg: Gpg,
    armored: String,
    encryption_ids: Vec<KeyId>,
}

impl GpgMessage {
    pub(crate) fn new(gpg: Gpg, armored: String, encryption_ids: Vec<KeyId>) -> Self {
        Self {
            gpg,
            armored,
            encryption_ids,
        }
    }
}

impl EncryptedMessage<GpgKey> for GpgMessage {
    type Decrypted = GpgSignedText;

    fn encryption_key_ids(&self) -> Vec<KeyId> {
        self.encryption_ids.clone()
    }

    async fn decrypt(&self, key: &GpgKey) -> Result<GpgSignedText> {
        let passphrase = key.passphrase().ok_or_else(|| MailPgpError::KeyLocked {
            key_id: key.key_id().to_string(),
        })?;

        let file = armored_file(&self.armored)?;
        let path = file.path().to_string_lossy().into_owned();
        let selector = key.selector();
        let stdin = format!("{}\n", passphrase.expose_secret());

        let output = self
            .gpg
            .run_async(
                &[
                    "--pinentry-mode",
                    "loopback",
                    "--passphrase-fd",
                    "0",
                    "--try-secret-key",
                    &selector,
                    "--output",
                    "-",
                    "--decrypt",
                    &path,
                ],
                Some(stdin.as_bytes()),
            )
            .await?;

        // A bad signature makes gpg exit non-zero even though the
        // plaintext is fine, so trust the status lines instead.
        if !status::decryption_ok(&output.status) {
            tracing::debug!(stderr = %output.stderr.trim(), "gpg could not decrypt");
            return Err(MailPgpError::DecryptionFailed);
        }

        Ok(GpgSignedText {
            text: String::from_utf8_lossy(&output.stdout).into_owned(),
            signatures: status::signatures(&output.status),
        })
    }
}

/// Readable text with the signatures gpg reported for it: the plaintext
/// of a decrypted message or the body of a cleartext-signed message.
#[derive(Debug, Clone, PartialEq)]
pub struct GpgSignedText {
    text: String,
    signatures: Vec<SignatureResult>,
}

impl GpgSignedText {
    pub(crate) fn new(text: String, signatures: Vec<SignatureResult>) -> Self {
        Self { text, signatures }
    }
}

impl SignedContent<GpgKey> for GpgSignedText {
    fn signing_key_ids(&self) -> Vec<KeyId> {
        let mut ids: Vec<KeyId> = Vec::new();
        for sig in &self.signatures {
            if !ids.contains(&sig.key_id) {
                ids.push(sig.key_id.clone());
            }
        }
        ids
    }

    /// gpg checks signatures against the whole keyring, so a good
    /// signature only counts when it was made by one of `keys`.
    fn verify(&self, keys: &[&GpgKey]) -> Result<Vec<SignatureResult>> {
        Ok(self
            .signatures
            .iter()
            .map(|sig| SignatureResult {
                valid: sig.valid && keys.iter().any(|k| k.matches(&sig.key_id)),
                key_id: sig.key_id.clone(),
            })
            .collect())
    }

    fn text(&self) -> &str {
        &self.text
    }
}

/// Extract the signed body of a cleartext-signed message.
///
/// Skips the armor header block (up to the first blank line), stops at
/// the signature block and undoes dash-escaping.
pub fn cleartext_body(armored: &str) -> Option<String> {
    let mut lines = armored
        .lines()
        .skip_while(|line| line.trim_end() != CLEARTEXT_HEADER);

    lines.next()?;
    let lines = lines.skip_while(|line| !line.trim().is_empty()).skip(1);

    let mut body = Vec::new();
    for line in lines {
        if line.trim_end() == SIGNATURE_HEADER {
            return Some(body.join("\n"));
        }
        body.push(line.strip_prefix("- ").unwrap_or(line));
    }

    None
}
