//! Key resolution and decrypt/verify orchestration for PGP mail.
//!
//! `core` holds the key store, resolver and the decrypt/verify services,
//! written against the ports in `core::traits`. `adapters` implements
//! those ports with the system `gpg` binary and a terminal prompt.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
