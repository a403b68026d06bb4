//! Parsing of gpg's machine-readable status lines (`--status-fd`).

use crate::core::models::key_id::KeyId;
use crate::core::models::key_record::SignatureResult;

const STATUS_PREFIX: &str = "[GNUPG:] ";

/// One `[GNUPG:] KEYWORD args...` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub keyword: String,
    pub args: Vec<String>,
}

impl StatusLine {
    fn first_arg(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// Split gpg stderr into status lines and the remaining human-readable
/// messages.
pub fn parse_status(stderr: &str) -> (Vec<StatusLine>, String) {
    let mut status = Vec::new();
    let mut messages = String::new();

    for line in stderr.lines() {
        match line.strip_prefix(STATUS_PREFIX) {
            Some(rest) => {
                let mut parts = rest.split_whitespace().map(str::to_string);
                if let Some(keyword) = parts.next() {
                    status.push(StatusLine {
                        keyword,
                        args: parts.collect(),
                    });
                }
            }
            None => {
                messages.push_str(line);
                messages.push('\n');
            }
        }
    }

    (status, messages)
}

/// Key ids a message is encrypted to (`ENC_TO`).
pub fn encryption_key_ids(status: &[StatusLine]) -> Vec<KeyId> {
    let mut ids: Vec<KeyId> = Vec::new();
    for line in status.iter().filter(|l| l.keyword == "ENC_TO") {
        if let Some(id) = line.first_arg().map(KeyId::new)
            && !ids.contains(&id)
        {
            ids.push(id);
        }
    }
    ids
}

/// One result per signature reported by gpg, in report order.
///
/// Only `GOODSIG` counts as valid. Expired, revoked, bad and
/// uncheckable (`ERRSIG`) signatures are reported as invalid.
pub fn signatures(status: &[StatusLine]) -> Vec<SignatureResult> {
    status
        .iter()
        .filter_map(|line| {
            let valid = match line.keyword.as_str() {
                "GOODSIG" => true,
                "BADSIG" | "EXPSIG" | "EXPKEYSIG" | "REVKEYSIG" | "ERRSIG" => false,
                _ => return None,
            };
            line.first_arg().map(|id| SignatureResult {
                valid,
                key_id: KeyId::new(id),
            })
        })
        .collect()
}

/// Whether gpg reported a successful decryption.
pub fn decryption_ok(status: &[StatusLine]) -> bool {
    status.iter().any(|l| l.keyword == "DECRYPTION_OKAY")
        && !status.iter().any(|l| l.keyword == "DECRYPTION_FAILED")
}

/// Whether gpg found no OpenPGP data in its input.
pub fn no_data(status: &[StatusLine]) -> bool {
    status.iter().any(|l| l.keyword == "NODATA")
}
