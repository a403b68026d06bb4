use std::path::Path;

use secrecy::SecretString;

use crate::adapters::prompt::terminal_prompt::TerminalPrompt;
use crate::cli::{output, render};
use crate::config::app_config::AppConfig;
use crate::core::errors::{MailPgpError, Result};
use crate::core::services::decryption::DecryptionService;
use crate::core::traits::crypto::{CryptoBackend, SignedContent};

use super::message_helpers::{gpg_backend, load_store, read_message, runtime};

/// Execute the `mailpgp decrypt` command.
///
/// Resolves the private key for the message (by key id, then by the
/// given recipient addresses), asks for its passphrase, decrypts and
/// reports the signature state. The plaintext goes to stdout unless
/// `output_path` is given.
pub fn execute(
    config: &AppConfig,
    file: Option<&str>,
    recipients: &[String],
    output_path: Option<&str>,
    passphrase: Option<&str>,
) -> Result<()> {
    let armored = read_message(file)?;
    let backend = gpg_backend(config)?;
    let message = backend.parse_armored_message(&armored)?;
    let store = load_store(&backend)?;

    let prompt = TerminalPrompt::new(config.prompt.max_attempts)
        .with_preset(passphrase.map(|p| SecretString::from(p.to_string())));
    let service = DecryptionService::new(&store, prompt);

    // Every failure stage collapses to "no plaintext".
    let mut result = Err(MailPgpError::DecryptionFailed);
    runtime()?.block_on(service.decrypt_with(
        &message,
        recipients,
        |key, decrypted, public, signing_ids| {
            let Some(decrypted) = decrypted else {
                return;
            };
            render::decrypted_by(key);
            render::signature(public, signing_ids.as_deref());
            result = write_plaintext(decrypted.text(), output_path);
        },
    ));

    result
}

fn write_plaintext(text: &str, output_path: Option<&str>) -> Result<()> {
    match output_path {
        Some(path) => {
            std::fs::write(Path::new(path), text)?;
            output::success(&format!("Plaintext written to {path}"));
        }
        None => print!("{text}"),
    }
    Ok(())
}
