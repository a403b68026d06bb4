use std::io::{self, BufRead, Write};

use colored::Colorize;
use secrecy::{ExposeSecret, SecretString};

use crate::core::models::key_record::{KeyRecord, KeyState};
use crate::core::traits::crypto::NativeKey;
use crate::core::traits::prompt::PassphrasePrompt;

/// Asks for a key and its passphrase on the terminal.
///
/// Prompts go to stderr so decrypted output on stdout stays clean.
/// With a preset passphrase (e.g. from `MAILPGP_PASSPHRASE`) nothing is
/// read from the terminal: candidates are tried in order, one unlock
/// attempt each, and the first that unlocks is returned.
pub struct TerminalPrompt {
    preset: Option<SecretString>,
    max_attempts: u32,
}

impl TerminalPrompt {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            preset: None,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn with_preset(mut self, passphrase: Option<SecretString>) -> Self {
        self.preset = passphrase;
        self
    }

    fn choose<'a, K>(&self, candidates: &[&'a KeyRecord<K>]) -> Option<&'a KeyRecord<K>> {
        match candidates {
            [] => None,
            [only] => Some(*only),
            _ => {
                eprintln!("\n  {}", "Several private keys can decrypt this message:".bold());
                for (i, record) in candidates.iter().enumerate() {
                    eprintln!("  {}. {}", i + 1, record.label());
                }
                eprint!("\n  Selection [1]: ");
                io::stderr().flush().ok()?;

                let mut input = String::new();
                io::stdin().lock().read_line(&mut input).ok()?;
                parse_choice(&input, candidates.len()).map(|i| candidates[i])
            }
        }
    }

    fn read_passphrase<K>(&self, record: &KeyRecord<K>) -> Option<SecretString> {
        rpassword::prompt_password(format!("  Passphrase for {}: ", record.label()))
            .ok()
            .map(SecretString::from)
    }
}

/// Map a 1-based menu answer to an index. Empty input picks the first
/// entry; anything else out of range cancels.
pub fn parse_choice(input: &str, count: usize) -> Option<usize> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return (count > 0).then_some(0);
    }
    let n: usize = trimmed.parse().ok()?;
    (1..=count).contains(&n).then(|| n - 1)
}

fn try_unlock<K: NativeKey>(key: &K, passphrase: &SecretString) -> bool {
    match key.unlock(passphrase) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(key = %key.key_id(), error = %e, "unlock attempt failed");
            false
        }
    }
}

impl<K: NativeKey> PassphrasePrompt<K> for TerminalPrompt {
    async fn unlock<'a>(&self, candidates: &[&'a KeyRecord<K>]) -> Option<&'a K> {
        if let Some(preset) = &self.preset {
            return candidates
                .iter()
                .filter_map(|record| record.native_handles().first())
                .find(|key| key.state() == KeyState::Unlocked || try_unlock(*key, preset));
        }

        let record = self.choose(candidates)?;
        let key = record.native_handles().first()?;
        if key.state() == KeyState::Unlocked {
            return Some(key);
        }

        for attempt in 1..=self.max_attempts {
            let passphrase = self.read_passphrase(record)?;
            if passphrase.expose_secret().is_empty() {
                return None;
            }
            if try_unlock(key, &passphrase) {
                return Some(key);
            }
            eprintln!(
                "  {} Wrong passphrase ({attempt}/{})",
                "⚠".yellow(),
                self.max_attempts
            );
        }

        None
    }
}
