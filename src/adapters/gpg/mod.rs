pub mod colons;
pub mod gpg_backend;
pub mod key;
pub mod message;
pub mod runner;
pub mod status;
