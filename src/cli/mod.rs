pub mod commands;
pub mod output;
pub mod render;

use clap::{Parser, Subcommand};

/// Decrypt and verify PGP mail with the keys in your gpg keyring.
#[derive(Parser, Debug)]
#[command(name = "mailpgp", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to alternative config file
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decrypt an armored PGP message and check its signature
    Decrypt {
        /// File holding the message (default: stdin)
        file: Option<String>,
        /// Recipient address to try when no key id matches. Repeatable.
        #[arg(long = "recipient", short = 'r')]
        recipients: Vec<String>,
        /// Write the plaintext here instead of stdout
        #[arg(long, short)]
        output: Option<String>,
        /// Passphrase for the private key (skips the prompt)
        #[arg(long, env = "MAILPGP_PASSPHRASE", hide_env_values = true)]
        passphrase: Option<String>,
    },

    /// Verify a cleartext-signed message
    Verify {
        /// File holding the message (default: stdin)
        file: Option<String>,
    },

    /// Inspect keys in the keyring
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeysAction {
    /// List known keys
    List {
        /// Only private keys
        #[arg(long, conflicts_with = "public")]
        private: bool,
        /// Only public keys
        #[arg(long)]
        public: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Find keys by hex key id or email address
    Find {
        /// Key id (with or without 0x) or email
        query: String,
    },
    /// Check the passphrase of a private key
    Unlock {
        /// Account address (default: [account] email from config)
        #[arg(long)]
        email: Option<String>,
        /// Passphrase (skips the prompt)
        #[arg(long, env = "MAILPGP_PASSPHRASE", hide_env_values = true)]
        passphrase: Option<String>,
    },
}
