//! Client-side identifiers and timestamps.

use chrono::{SecondsFormat, Utc};
use rand::Rng;

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_RANDOM_LEN: usize = 9;

/// Fresh message id: `msg_<9 base36 chars>_<epoch ms>`.
pub fn generate_message_id() -> String {
    let mut rng = rand::thread_rng();
    let random: String = (0..ID_RANDOM_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect();
    format!("msg_{random}_{}", Utc::now().timestamp_millis())
}

/// Default identity when none is configured: `user_<0..=9999>`.
pub fn generate_user_id() -> String {
    format!("user_{}", rand::thread_rng().gen_range(0..10_000))
}

/// Current UTC time as ISO-8601 with millisecond precision and a `Z` suffix.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
