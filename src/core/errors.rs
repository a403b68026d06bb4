use std::path::PathBuf;

/// All domain errors for mailpgp.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum MailPgpError {
    #[error(
        "File not found: {path}\n\n  \
         Check that the path is correct and the file exists.\n  \
         Omit the file argument to read the message from stdin."
    )]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "Malformed message: {detail}\n\n  \
         Expected an ASCII-armored block such as:\n    \
         -----BEGIN PGP MESSAGE-----\n    \
         -----BEGIN PGP SIGNED MESSAGE-----"
    )]
    MalformedMessage { detail: String },

    #[error(
        "GPG is not available: {reason}\n\n  \
         Solutions:\n    \
         → Install GnuPG and make sure 'gpg' is in PATH\n    \
         → Or point [gpg] binary in config.toml at your gpg executable"
    )]
    GpgUnavailable { reason: String },

    #[error("gpg failed: {reason}")]
    GpgFailed { reason: String },

    #[error("Passphrase must not be empty")]
    EmptyPassphrase,

    #[error("Wrong passphrase for key {key_id}")]
    WrongPassphrase { key_id: String },

    #[error("Key {key_id} is locked; unlock it with its passphrase first")]
    KeyLocked { key_id: String },

    #[error(
        "Decryption error\n\n  \
         None of your private keys could decrypt this message.\n\n  \
         Solutions:\n    \
         → List your private keys: mailpgp keys list --private\n    \
         → Pass the message recipients: mailpgp decrypt --recipient <email>\n    \
         → Check your passphrase: mailpgp keys unlock --email <email>"
    )]
    DecryptionFailed,

    #[error("Unverified signature{}", format_key_ids(.key_ids))]
    SignatureUnverified { key_ids: Vec<String> },

    #[error("No key matches '{query}'")]
    KeyNotFound { query: String },

    #[error("Failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_key_ids(key_ids: &[String]) -> String {
    if key_ids.is_empty() {
        String::new()
    } else {
        format!(" ({})", key_ids.join(", "))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MailPgpError>;
