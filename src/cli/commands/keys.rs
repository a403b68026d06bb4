use secrecy::{ExposeSecret, SecretString};

use crate::adapters::gpg::key::GpgKey;
use crate::cli::{KeysAction, output, render};
use crate::config::app_config::AppConfig;
use crate::core::errors::{MailPgpError, Result};
use crate::core::models::key_id::KeyId;
use crate::core::models::key_record::KeyRecord;
use crate::core::services::key_store::KeyStore;

use super::message_helpers::{gpg_backend, load_store};

/// Execute the `mailpgp keys` command.
pub fn execute(config: &AppConfig, action: &KeysAction) -> Result<()> {
    let store = load_store(&gpg_backend(config)?)?;

    match action {
        KeysAction::List {
            private,
            public,
            json,
        } => execute_list(&store, *private, *public, *json),
        KeysAction::Find { query } => execute_find(&store, query),
        KeysAction::Unlock { email, passphrase } => {
            execute_unlock(config, &store, email.as_deref(), passphrase.as_deref())
        }
    }
}

fn execute_list(store: &KeyStore<GpgKey>, private: bool, public: bool, json: bool) -> Result<()> {
    let (title, records): (&str, Vec<&KeyRecord<GpgKey>>) = if private {
        ("Private keys", store.private_keys().collect())
    } else if public {
        ("Public keys", store.public_keys().collect())
    } else {
        ("Keys", store.records().iter().collect())
    };

    if json {
        return render::print_keys_json(&records);
    }

    if records.is_empty() {
        output::warning("No keys found in the gpg keyring.");
        return Ok(());
    }

    render::print_keys(title, &records);
    Ok(())
}

/// Look a query up as a key id first, then as an email address, in
/// both partitions.
pub fn find<'a>(store: &'a KeyStore<GpgKey>, query: &str) -> Vec<&'a KeyRecord<GpgKey>> {
    match KeyId::parse(query) {
        Some(id) => [
            store.find_public_by_hex(id.to_hex()),
            store.find_private_by_hex(id.to_hex()),
        ]
        .into_iter()
        .flatten()
        .collect(),
        None => {
            let email = query.trim();
            let mut matches = store.find_all_public_by_email(email);
            matches.extend(store.find_all_private_by_email(email));
            matches
        }
    }
}

fn execute_find(store: &KeyStore<GpgKey>, query: &str) -> Result<()> {
    let matches = find(store, query);
    if matches.is_empty() {
        return Err(MailPgpError::KeyNotFound {
            query: query.to_string(),
        });
    }

    render::print_keys(&format!("Matches for '{query}'"), &matches);
    Ok(())
}

/// Check a private key's passphrase. Without `--email` the key of the
/// configured account is used.
fn execute_unlock(
    config: &AppConfig,
    store: &KeyStore<GpgKey>,
    email: Option<&str>,
    passphrase: Option<&str>,
) -> Result<()> {
    let account = config.account.email.as_deref();
    let address = email.or(account).ok_or_else(|| MailPgpError::InvalidConfig {
        detail: "No account address.\n\n  \
                 Solutions:\n    \
                 → Pass it explicitly: mailpgp keys unlock --email <address>\n    \
                 → Or set [account] email in config.toml"
            .into(),
    })?;

    let record = store
        .find_private_by_email(address)
        .ok_or_else(|| MailPgpError::KeyNotFound {
            query: address.to_string(),
        })?;

    let passphrase = match passphrase {
        Some(p) => SecretString::from(p.to_string()),
        None => SecretString::from(rpassword::prompt_password(format!(
            "  Passphrase for {}: ",
            record.label()
        ))?),
    };
    if passphrase.expose_secret().is_empty() {
        return Err(MailPgpError::EmptyPassphrase);
    }

    let unlocked = if email.is_some() {
        store.unlock_private_by_email(address, &passphrase)
    } else {
        store.unlock_self(address, &passphrase)
    };

    match unlocked {
        Some(_) => {
            output::success(&format!("Passphrase accepted for {}", record.label()));
            Ok(())
        }
        None => Err(MailPgpError::WrongPassphrase {
            key_id: record.primary_id.clone(),
        }),
    }
}
