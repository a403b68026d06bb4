use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::errors::{MailPgpError, Result};

/// Top-level mailpgp configuration read from `config.toml`.
///
/// Every section is optional; a missing file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gpg: GpgSection,
    pub account: AccountSection,
    pub prompt: PromptSection,
}

impl AppConfig {
    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, the per-user file at
    /// `<config_dir>/mailpgp/config.toml` is read if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(MailPgpError::FileNotFound {
                        path: p.to_path_buf(),
                    });
                }
                Self::from_file(p)
            }
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::from_file(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Location of the per-user config file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("mailpgp").join("config.toml"))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content).map_err(|e| match e {
            MailPgpError::InvalidConfig { detail } => MailPgpError::InvalidConfig {
                detail: format!("{}: {detail}", path.display()),
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| MailPgpError::InvalidConfig {
            detail: format!("Failed to parse config.toml: {e}"),
        })?;

        if config.prompt.max_attempts == 0 {
            return Err(MailPgpError::InvalidConfig {
                detail: "[prompt] max_attempts must be at least 1".into(),
            });
        }
        if config.account.email.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(MailPgpError::InvalidConfig {
                detail: "[account] email must not be empty".into(),
            });
        }

        Ok(config)
    }
}

/// The `[gpg]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GpgSection {
    /// gpg executable, looked up in PATH when relative.
    pub binary: PathBuf,
    /// Alternative keyring directory (`--homedir`).
    pub homedir: Option<PathBuf>,
}

impl Default for GpgSection {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("gpg"),
            homedir: None,
        }
    }
}

/// The `[account]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountSection {
    /// Address of the mailbox owner, used for `keys unlock`.
    pub email: Option<String>,
}

/// The `[prompt]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptSection {
    pub max_attempts: u32,
}

impl Default for PromptSection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}
