/// Hex identifier of a PGP key or subkey as reported by the crypto backend.
///
/// Stored uppercase so that equality is plain hex-string equality.
/// Fingerprints are shortened to the 16-digit long key id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyId(String);

/// Length of a long key id in hex digits.
const LONG_KEY_ID_LEN: usize = 16;

impl KeyId {
    /// Build a key id from a long key id or a v4 fingerprint.
    pub fn new(hex: &str) -> Self {
        let hex = hex.trim().to_ascii_uppercase();
        if hex.len() == 40 && hex.is_ascii() {
            return Self(hex[hex.len() - LONG_KEY_ID_LEN..].to_string());
        }
        Self(hex)
    }

    /// The id as an uppercase hex string.
    pub fn to_hex(&self) -> &str {
        &self.0
    }

    /// Parse a user-supplied query, accepting an optional `0x` prefix.
    /// Returns `None` when the query is not a hex string.
    pub fn parse(query: &str) -> Option<Self> {
        let trimmed = query.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self::new(hex))
    }
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
