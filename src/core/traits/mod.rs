pub mod crypto;
pub mod keyring;
pub mod prompt;
