pub mod decryption;
pub mod key_resolver;
pub mod key_store;
pub mod verification;
