pub mod key_id;
pub mod key_record;
pub mod outcome;
