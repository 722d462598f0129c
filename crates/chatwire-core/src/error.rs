//! Shared error type across chatwire crates.

use thiserror::Error;

/// Stable error codes surfaced to listeners.
///
/// The `MSG_*` strings are the ones the messaging endpoint itself uses, so a
/// UI can treat local and remote failures uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Configuration rejected at load time.
    InvalidConfig,
    /// Envelope or room failed validation.
    InvalidFormat,
    /// Unknown `message_type` tag.
    InvalidContentType,
    /// Frame was not parseable JSON.
    InvalidJson,
    /// Transport could not be opened.
    ConnectionFailed,
    /// No open connection.
    Disconnected,
    /// Outbound frame could not be queued.
    SendFailed,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation carried in error events.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidConfig => "CFG_INVALID",
            ErrorCode::InvalidFormat => "MSG_FMT_100",
            ErrorCode::InvalidContentType => "MSG_FMT_101",
            ErrorCode::InvalidJson => "MSG_FMT_103",
            ErrorCode::ConnectionFailed => "MSG_WSK_200",
            ErrorCode::Disconnected => "MSG_WSK_201",
            ErrorCode::SendFailed => "MSG_WSK_202",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ChatwireError>;

/// Unified error type used by core and client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatwireError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid room: {0}")]
    InvalidRoom(String),
    #[error("malformed frame: {0}")]
    Malformed(String),
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),
    #[error("not connected")]
    NotConnected,
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("connect failed: {0}")]
    ConnectFailed(String),
    #[error("connection closed (code {code}): {reason}")]
    Closed { code: u16, reason: String },
    #[error("connection attempt superseded")]
    Superseded,
    #[error("internal: {0}")]
    Internal(String),
}

impl ChatwireError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ChatwireError::InvalidConfig(_) => ErrorCode::InvalidConfig,
            ChatwireError::InvalidRoom(_) => ErrorCode::InvalidFormat,
            ChatwireError::Malformed(_) => ErrorCode::InvalidJson,
            ChatwireError::UnknownMessageType(_) => ErrorCode::InvalidContentType,
            ChatwireError::NotConnected => ErrorCode::Disconnected,
            ChatwireError::SendFailed(_) => ErrorCode::SendFailed,
            ChatwireError::ConnectFailed(_) => ErrorCode::ConnectionFailed,
            ChatwireError::Closed { .. } => ErrorCode::Disconnected,
            ChatwireError::Superseded => ErrorCode::Disconnected,
            ChatwireError::Internal(_) => ErrorCode::Internal,
        }
    }
}
