use std::fmt;

use chatwire_core::error::ChatwireError;
use chatwire_core::protocol::Envelope;

/// Listener channels. String forms match the names UI code registers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Message,
    Connect,
    Disconnect,
    Error,
    Typing,
    ReadReceipt,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::Message,
        EventKind::Connect,
        EventKind::Disconnect,
        EventKind::Error,
        EventKind::Typing,
        EventKind::ReadReceipt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Message => "message",
            EventKind::Connect => "connect",
            EventKind::Disconnect => "disconnect",
            EventKind::Error => "error",
            EventKind::Typing => "typing",
            EventKind::ReadReceipt => "readReceipt",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a connection went away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Closed by `disconnect()` or replaced by a newer `connect()`.
    Requested,
    /// Peer closed with the normal-closure code. No reconnect follows.
    ClosedByPeer { code: u16, reason: String },
    /// Abnormal close (or failed open).
    Lost { code: u16, reason: String, will_retry: bool },
    /// Abnormal close with the retry budget spent. Terminal.
    RetriesExhausted { attempts: u32, code: u16, reason: String },
}

impl DisconnectReason {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DisconnectReason::Lost { will_retry: true, .. })
    }
}

/// Payload of the `error` channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEvent {
    pub message: String,
    pub code: Option<String>,
    /// The remote `error` envelope, for remote-reported errors.
    pub envelope: Option<Envelope>,
}

impl ErrorEvent {
    pub fn local(err: &ChatwireError) -> Self {
        Self {
            message: err.to_string(),
            code: Some(err.code().as_str().to_string()),
            envelope: None,
        }
    }

    /// From an inbound `error` envelope. Falls back to the endpoint's
    /// top-level `error.message` when the payload carries no text.
    pub fn remote(env: Envelope) -> Self {
        let detail = env.extensions.get("error");
        let message = env
            .body
            .text()
            .map(str::to_string)
            .or_else(|| {
                detail
                    .and_then(|d| d.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_default();
        let code = detail
            .and_then(|d| d.get("code"))
            .and_then(|c| c.as_str())
            .map(str::to_string);
        Self {
            message,
            code,
            envelope: Some(env),
        }
    }
}

/// Event delivered to listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Message(Envelope),
    Connect { room: String },
    Disconnect(DisconnectReason),
    Error(ErrorEvent),
    Typing(Envelope),
    ReadReceipt(Envelope),
}

impl ClientEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ClientEvent::Message(_) => EventKind::Message,
            ClientEvent::Connect { .. } => EventKind::Connect,
            ClientEvent::Disconnect(_) => EventKind::Disconnect,
            ClientEvent::Error(_) => EventKind::Error,
            ClientEvent::Typing(_) => EventKind::Typing,
            ClientEvent::ReadReceipt(_) => EventKind::ReadReceipt,
        }
    }

    /// The inbound envelope behind this event, if any.
    pub fn envelope(&self) -> Option<&Envelope> {
        match self {
            ClientEvent::Message(env) | ClientEvent::Typing(env) | ClientEvent::ReadReceipt(env) => {
                Some(env)
            }
            ClientEvent::Error(e) => e.envelope.as_ref(),
            ClientEvent::Connect { .. } | ClientEvent::Disconnect(_) => None,
        }
    }
}
