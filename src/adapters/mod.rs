pub mod gpg;
pub mod prompt;
