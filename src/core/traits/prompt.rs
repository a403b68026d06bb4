use crate::core::models::key_record::KeyRecord;

/// Port for the interactive passphrase prompt.
///
/// Given a non-empty list of candidate private records, lets the user
/// pick one and unlock it. Resolves to the unlocked handle, or `None`
/// when the user cancels or runs out of attempts.
#[allow(async_fn_in_trait)]
pub trait PassphrasePrompt<K> {
    async fn unlock<'a>(&self, candidates: &[&'a KeyRecord<K>]) -> Option<&'a K>;
}
