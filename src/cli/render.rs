//! Terminal rendering of keys and decrypt/verify outcomes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::output;
use crate::core::models::key_id::KeyId;
use crate::core::models::key_record::KeyRecord;
use crate::core::services::verification::join_ids;

/// Report the signature state of a decrypted or cleartext message from
/// its flattened parts: the verifying record, or the unverified signing
/// ids, or neither for unsigned content.
pub fn signature<K>(public: Option<&KeyRecord<K>>, signing_ids: Option<&[KeyId]>) {
    match (public, signing_ids) {
        (Some(record), _) => output::success(&format!("Good signature from {}", record.label())),
        (None, Some(ids)) => output::warning(&unverified_message(ids)),
        (None, None) => output::detail("Message is not signed"),
    }
}

pub fn unverified_message(ids: &[KeyId]) -> String {
    if ids.is_empty() {
        "Unverified signature".to_string()
    } else {
        format!("Unverified signature ({})", join_ids(ids))
    }
}

pub fn decrypted_by<K>(record: Option<&KeyRecord<K>>) {
    match record {
        Some(record) => output::success(&format!("Decrypted with {}", record.label())),
        None => output::success("Decrypted"),
    }
}

/// Serializable view of a key record for `--json` output.
#[derive(Debug, Serialize)]
pub struct KeySummary<'a> {
    pub id: &'a str,
    pub private: bool,
    pub user: Option<&'a str>,
    pub emails: &'a [String],
    pub sub_ids: &'a [String],
    pub created: Option<DateTime<Utc>>,
}

impl<'a, K> From<&'a KeyRecord<K>> for KeySummary<'a> {
    fn from(record: &'a KeyRecord<K>) -> Self {
        Self {
            id: &record.primary_id,
            private: record.is_private,
            user: record.user.as_deref(),
            emails: &record.emails,
            sub_ids: &record.sub_ids,
            created: record.created,
        }
    }
}

/// One key per block: kind, id, creation date, then user and emails.
pub fn key_lines<K>(record: &KeyRecord<K>) -> Vec<String> {
    let kind = if record.is_private { "sec" } else { "pub" };
    let created = record
        .created
        .map(|c| c.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let mut lines = vec![format!("  {kind}  {}  {created}", record.primary_id)
        .trim_end()
        .to_string()];
    if let Some(user) = &record.user {
        lines.push(format!("       {user}"));
    }
    for email in record.emails.iter().filter(|e| {
        record
            .user
            .as_deref()
            .is_none_or(|user| !user.contains(e.as_str()))
    }) {
        lines.push(format!("       <{email}>"));
    }
    for sub in &record.sub_ids {
        lines.push(format!("       sub {sub}"));
    }
    lines
}

pub fn print_keys<K>(title: &str, records: &[&KeyRecord<K>]) {
    output::header(&format!("{title} ({})", records.len()));
    for record in records {
        for line in key_lines(record) {
            println!("{}", line);
        }
    }
}

pub fn print_keys_json<K>(records: &[&KeyRecord<K>]) -> crate::core::errors::Result<()> {
    let summaries: Vec<KeySummary<'_>> = records.iter().map(|r| KeySummary::from(*r)).collect();
    let json = serde_json::to_string_pretty(&summaries)?;
    println!("{json}");
    Ok(())
}
