pub mod decrypt;
pub mod keys;
pub mod message_helpers;
pub mod verify;
