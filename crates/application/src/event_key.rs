use std::collections::BTreeSet;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use eventdesk_core::{AppError, AppResult, EVENT_KEY_LENGTH, EventKey};

/// Generates one candidate event key from fifteen random bytes.
///
/// Fifteen bytes encode to exactly twenty base64url characters, matching
/// the external key format with no truncation or padding.
pub(crate) fn candidate_key() -> AppResult<EventKey> {
    let mut bytes = [0u8; 15];
    getrandom::fill(&mut bytes)
        .map_err(|error| AppError::Internal(format!("failed to generate event key: {error}")))?;

    let encoded = URL_SAFE_NO_PAD.encode(bytes);
    debug_assert_eq!(encoded.len(), EVENT_KEY_LENGTH);
    EventKey::new(encoded)
}

/// Generates a key that does not collide with any existing key.
pub(crate) fn generate_unique_key(existing: &BTreeSet<EventKey>) -> AppResult<EventKey> {
    loop {
        let key = candidate_key()?;
        if !existing.contains(&key) {
            return Ok(key);
        }
    }
}
