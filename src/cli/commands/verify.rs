use crate::cli::output;
use crate::config::app_config::AppConfig;
use crate::core::errors::{MailPgpError, Result};
use crate::core::services::verification::VerificationService;
use crate::core::traits::crypto::{CryptoBackend, SignedContent};

use super::message_helpers::{gpg_backend, load_store, read_message};

/// Execute the `mailpgp verify` command.
///
/// Succeeds only when a known public key made a good signature; the
/// signed text is then printed to stdout.
pub fn execute(config: &AppConfig, file: Option<&str>) -> Result<()> {
    let armored = read_message(file)?;
    let backend = gpg_backend(config)?;
    let cleartext = backend.parse_armored_cleartext(&armored)?;
    let store = load_store(&backend)?;

    let mut unverified = Vec::new();
    let verified =
        VerificationService::new(&store).verify_signed_only(&cleartext, |record, signing_ids| {
            if let Some(record) = record {
                output::success(&format!("Good signature from {}", record.label()));
            }
            if let Some(ids) = signing_ids {
                unverified = ids;
            }
        });

    if !verified {
        return Err(MailPgpError::SignatureUnverified {
            key_ids: unverified.iter().map(|id| id.to_string()).collect(),
        });
    }

    print!("{}", cleartext.text());
    if !cleartext.text().ends_with('\n') {
        println!();
    }
    Ok(())
}
