use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

/// Email address enclosed in angle brackets, as in `Name <user@host>`.
static ANGLE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^<>\s]+@[^<>\s]+)>").expect("valid email regex"));

/// A bare address used as the whole user id.
static BARE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^<>\s]+@[^<>\s]+$").expect("valid email regex"));

/// A key as listed by `gpg --with-colons --list-keys` (or
/// `--list-secret-keys`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListedKey {
    pub key_id: String,
    pub fingerprint: Option<String>,
    pub sub_ids: Vec<String>,
    pub user_ids: Vec<String>,
    pub emails: Vec<String>,
    pub created: Option<DateTime<Utc>>,
}

/// Parses gpg's colon-delimited key listing.
///
/// Handles:
/// - `pub`/`sec` records, each starting a new key
/// - `sub`/`ssb` subkeys
/// - `fpr` lines (the first one after the primary key is its fingerprint)
/// - `uid` lines, skipping revoked ones and decoding `\xNN` escapes
///
/// Other record types (`tru`, `grp`, `sig`, ...) are ignored.
pub struct ColonListingParser;

impl ColonListingParser {
    pub fn parse(listing: &str) -> Vec<ListedKey> {
        let mut keys: Vec<ListedKey> = Vec::new();
        let mut after_primary = false;

        for line in listing.lines() {
            let fields: Vec<&str> = line.split(':').collect();
            let field = |i: usize| fields.get(i).copied().unwrap_or("");

            match field(0) {
                "pub" | "sec" => {
                    keys.push(ListedKey {
                        key_id: field(4).to_ascii_uppercase(),
                        created: parse_timestamp(field(5)),
                        ..ListedKey::default()
                    });
                    after_primary = true;
                }
                "fpr" => {
                    if after_primary && let Some(key) = keys.last_mut() {
                        key.fingerprint = Some(field(9).to_ascii_uppercase());
                    }
                    after_primary = false;
                }
                "sub" | "ssb" => {
                    after_primary = false;
                    if let Some(key) = keys.last_mut() {
                        let id = field(4).to_ascii_uppercase();
                        if !id.is_empty() && !key.sub_ids.contains(&id) {
                            key.sub_ids.push(id);
                        }
                    }
                }
                "uid" => {
                    after_primary = false;
                    // Revoked user ids no longer speak for the key
                    if field(1) == "r" {
                        continue;
                    }
                    if let Some(key) = keys.last_mut() {
                        let user_id = unescape(field(9));
                        if let Some(email) = extract_email(&user_id)
                            && !key.emails.contains(&email)
                        {
                            key.emails.push(email);
                        }
                        key.user_ids.push(user_id);
                    }
                }
                _ => {}
            }
        }

        keys
    }
}

/// Pull the email address out of a user id string.
pub fn extract_email(user_id: &str) -> Option<String> {
    if let Some(caps) = ANGLE_EMAIL.captures(user_id) {
        return Some(caps[1].to_string());
    }
    let trimmed = user_id.trim();
    BARE_EMAIL
        .is_match(trimmed)
        .then(|| trimmed.to_string())
}

/// Decode gpg's `\xNN` escapes (used for `:` and control characters).
fn unescape(field: &str) -> String {
    let mut bytes = Vec::with_capacity(field.len());
    let raw = field.as_bytes();
    let mut i = 0;

    while i < raw.len() {
        if raw[i] == b'\\'
            && raw.get(i + 1) == Some(&b'x')
            && let Some(hex) = field.get(i + 2..i + 4)
            && let Ok(byte) = u8::from_str_radix(hex, 16)
        {
            bytes.push(byte);
            i += 4;
            continue;
        }
        bytes.push(raw[i]);
        i += 1;
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

/// Creation dates are seconds since the epoch in fixed-list mode.
fn parse_timestamp(field: &str) -> Option<DateTime<Utc>> {
    field
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
tru::1:1700000000:0:3:1:5
pub:u:3072:1:1111222233334444:1700000000:::u:::scESC:::::::23::0:
fpr:::::::::AAAABBBBCCCCDDDDEEEEFFFF1111222233334444:
uid:u::::1700000000::HASH1::Alice Example <alice@example.com>::::::::::0:
uid:r::::1700000000::HASH2::Alice Old <alice@old.example.com>::::::::::0:
uid:u::::1700000000::HASH3::alice@work.example.com::::::::::0:
sub:u:3072:1:5555666677778888:1700000000::::::e:::::23:
fpr:::::::::00001111222233334444555566667777:5555666677778888:
pub:f:255:22:9999AAAA9999AAAA:1710000000:::-:::scSC:::::::23::0:
fpr:::::::::0000000000000000000000009999AAAA9999AAAA:
uid:f::::1710000000::HASH4::Bob \\x3a Builder <bob@example.com>::::::::::0:
";

    #[test]
    fn parses_primary_keys_in_order() {
        let keys = ColonListingParser::parse(LISTING);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].key_id, "1111222233334444");
        assert_eq!(keys[1].key_id, "9999AAAA9999AAAA");
    }

    #[test]
    fn first_fingerprint_belongs_to_primary() {
        let keys = ColonListingParser::parse(LISTING);
        assert_eq!(
            keys[0].fingerprint.as_deref(),
            Some("AAAABBBBCCCCDDDDEEEEFFFF1111222233334444")
        );
    }

    #[test]
    fn collects_subkeys() {
        let keys = ColonListingParser::parse(LISTING);
        assert_eq!(keys[0].sub_ids, vec!["5555666677778888"]);
        assert!(keys[1].sub_ids.is_empty());
    }

    #[test]
    fn collects_emails_and_skips_revoked_uids() {
        let keys = ColonListingParser::parse(LISTING);
        assert_eq!(
            keys[0].emails,
            vec!["alice@example.com", "alice@work.example.com"]
        );
        assert_eq!(keys[0].user_ids[0], "Alice Example <alice@example.com>");
        assert_eq!(keys[0].user_ids.len(), 2);
    }

    #[test]
    fn decodes_escaped_user_ids() {
        let keys = ColonListingParser::parse(LISTING);
        assert_eq!(keys[1].user_ids[0], "Bob : Builder <bob@example.com>");
        assert_eq!(keys[1].emails, vec!["bob@example.com"]);
    }

    #[test]
    fn parses_creation_time() {
        let keys = ColonListingParser::parse(LISTING);
        assert_eq!(keys[0].created.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn extract_email_variants() {
        assert_eq!(
            extract_email("Carol <carol@example.com>").as_deref(),
            Some("carol@example.com")
        );
        assert_eq!(
            extract_email("carol@example.com").as_deref(),
            Some("carol@example.com")
        );
        assert!(extract_email("Carol without address").is_none());
    }

    #[test]
    fn empty_listing_has_no_keys() {
        assert!(ColonListingParser::parse("").is_empty());
    }
}
