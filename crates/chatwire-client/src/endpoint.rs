//! Endpoint derivation: `{ws|wss}://{host}/ws/messaging/{room}/`.
//!
//! The scheme follows the hosting origin: a secure origin upgrades to `wss`.

use chatwire_core::error::{ChatwireError, Result};

pub const MESSAGING_PATH: &str = "/ws/messaging/";

/// Characters that would end or re-encode the path segment.
const ROOM_RESERVED: [char; 4] = ['/', '?', '#', '%'];

/// Rooms are one literal path segment on the endpoint.
pub fn validate_room(room: &str) -> Result<()> {
    if room.is_empty() {
        return Err(ChatwireError::InvalidRoom("room must not be empty".into()));
    }
    if room.contains(ROOM_RESERVED) || room.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ChatwireError::InvalidRoom(format!(
            "room must be a single path segment: {room:?}"
        )));
    }
    Ok(())
}

/// Split an origin into the socket scheme and its authority (`host[:port]`).
pub fn split_origin(origin: &str) -> Result<(&'static str, &str)> {
    let (scheme, rest) = if let Some(rest) = origin.strip_prefix("https://") {
        ("wss", rest)
    } else if let Some(rest) = origin.strip_prefix("http://") {
        ("ws", rest)
    } else if let Some(rest) = origin.strip_prefix("wss://") {
        ("wss", rest)
    } else if let Some(rest) = origin.strip_prefix("ws://") {
        ("ws", rest)
    } else {
        return Err(ChatwireError::InvalidConfig(format!(
            "origin must start with http:// or https://: {origin}"
        )));
    };

    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(ChatwireError::InvalidConfig(format!("origin has no host: {origin}")));
    }
    Ok((scheme, host))
}

pub fn messaging_url(origin: &str, room: &str) -> Result<String> {
    validate_room(room)?;
    let (scheme, host) = split_origin(origin)?;
    Ok(format!("{scheme}://{host}{MESSAGING_PATH}{room}/"))
}
