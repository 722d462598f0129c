//! Messaging envelope (JSON).
//!
//! On the wire the envelope is a flat object whose `payload` shape depends on
//! `message_type`. In memory the pair is a single [`Body`] variant, so a chat
//! payload can never be sent under a `typing` tag.
//!
//! Decoding goes through [`WireEnvelope`] first (syntax) and then
//! `Envelope::try_from` (tag + payload shape), which lets callers tell a
//! corrupt frame apart from a well-formed frame of an unknown type.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ChatwireError, Result};
use crate::protocol::ids::{generate_message_id, now_timestamp};

/// Closed set of message tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Chat,
    AgentResponse,
    Typing,
    ReadReceipt,
    Ping,
    Pong,
    ConnectAck,
    Error,
}

impl MessageType {
    pub const ALL: [MessageType; 8] = [
        MessageType::Chat,
        MessageType::AgentResponse,
        MessageType::Typing,
        MessageType::ReadReceipt,
        MessageType::Ping,
        MessageType::Pong,
        MessageType::ConnectAck,
        MessageType::Error,
    ];

    /// Tag as it appears in `message_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Chat => "chat",
            MessageType::AgentResponse => "agent_response",
            MessageType::Typing => "typing",
            MessageType::ReadReceipt => "read_receipt",
            MessageType::Ping => "ping",
            MessageType::Pong => "pong",
            MessageType::ConnectAck => "connect_ack",
            MessageType::Error => "error",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Originator class. The endpoint signs its own frames as `system`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderKind {
    User,
    Agent,
    System,
}

/// Envelope originator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SenderKind,
    pub name: String,
}

impl Sender {
    pub fn user(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: SenderKind::User,
            name: name.into(),
        }
    }
}

/// Body of `chat` and `agent_response`.
///
/// `extra` keeps whatever else the endpoint attached (`group_id`, `reply_to`,
/// `mentions`, `confidence`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPayload {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextPayload {
    pub fn new(text: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: Some(format.into()),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingPayload {
    #[serde(default = "default_typing_status")]
    pub status: String,
    #[serde(default)]
    pub remaining_text: u64,
}

fn default_typing_status() -> String {
    "typing".into()
}

impl TypingPayload {
    pub fn typing(remaining_text: u64) -> Self {
        Self {
            status: default_typing_status(),
            remaining_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReadReceiptPayload {
    #[serde(default)]
    pub message_ids: Vec<String>,
}

/// Body of `connect_ack`. `extra` keeps `server_info` / `user_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectAckPayload {
    /// Empty when the endpoint did not send one.
    #[serde(default)]
    pub session_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a remote-reported `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed payload, one variant per `message_type`.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Chat(TextPayload),
    AgentResponse(TextPayload),
    Typing(TypingPayload),
    ReadReceipt(ReadReceiptPayload),
    Ping,
    Pong,
    ConnectAck(ConnectAckPayload),
    Error(ErrorPayload),
}

impl Body {
    pub fn message_type(&self) -> MessageType {
        match self {
            Body::Chat(_) => MessageType::Chat,
            Body::AgentResponse(_) => MessageType::AgentResponse,
            Body::Typing(_) => MessageType::Typing,
            Body::ReadReceipt(_) => MessageType::ReadReceipt,
            Body::Ping => MessageType::Ping,
            Body::Pong => MessageType::Pong,
            Body::ConnectAck(_) => MessageType::ConnectAck,
            Body::Error(_) => MessageType::Error,
        }
    }

    /// Text of a chat-family body.
    pub fn text(&self) -> Option<&str> {
        match self {
            Body::Chat(p) | Body::AgentResponse(p) => Some(&p.text),
            Body::Error(p) => p.text.as_deref(),
            _ => None,
        }
    }

    /// Parse a raw `payload` under a known tag. Missing fields take their
    /// defaults and a null or absent payload reads as `{}`; only a payload of
    /// the wrong shape is rejected.
    pub fn from_parts(message_type: MessageType, payload: Value) -> Result<Self> {
        let payload = match payload {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        fn typed<T: serde::de::DeserializeOwned>(ty: MessageType, payload: Value) -> Result<T> {
            serde_json::from_value(payload)
                .map_err(|e| ChatwireError::Malformed(format!("{ty} payload: {e}")))
        }

        Ok(match message_type {
            MessageType::Chat => Body::Chat(typed(message_type, payload)?),
            MessageType::AgentResponse => Body::AgentResponse(typed(message_type, payload)?),
            MessageType::Typing => Body::Typing(typed(message_type, payload)?),
            MessageType::ReadReceipt => Body::ReadReceipt(typed(message_type, payload)?),
            // liveness frames carry nothing we read
            MessageType::Ping => Body::Ping,
            MessageType::Pong => Body::Pong,
            MessageType::ConnectAck => Body::ConnectAck(typed(message_type, payload)?),
            MessageType::Error => Body::Error(typed(message_type, payload)?),
        })
    }

    /// Encode the payload half of the wire pair.
    pub fn to_payload(&self) -> Result<Value> {
        let v = match self {
            Body::Chat(p) | Body::AgentResponse(p) => serde_json::to_value(p),
            Body::Typing(p) => serde_json::to_value(p),
            Body::ReadReceipt(p) => serde_json::to_value(p),
            Body::Ping | Body::Pong => Ok(Value::Object(Map::new())),
            Body::ConnectAck(p) => serde_json::to_value(p),
            Body::Error(p) => serde_json::to_value(p),
        };
        v.map_err(|e| ChatwireError::Internal(format!("payload encode failed: {e}")))
    }
}

/// Flat wire form. Unknown top-level keys land in `extensions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEnvelope {
    #[serde(default)]
    pub message_id: String,
    pub message_type: String,
    pub sender: Sender,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

/// Unit of wire exchange.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "WireEnvelope")]
pub struct Envelope {
    pub message_id: String,
    pub sender: Sender,
    pub timestamp: String,
    pub body: Body,
    pub metadata: Map<String, Value>,
    /// Top-level fields outside the envelope schema, kept verbatim.
    pub extensions: Map<String, Value>,
}

impl Envelope {
    /// Outbound envelope with a fresh id and the current timestamp.
    pub fn new(sender: Sender, body: Body) -> Self {
        Self {
            message_id: generate_message_id(),
            sender,
            timestamp: now_timestamp(),
            body,
            metadata: Map::new(),
            extensions: Map::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn message_type(&self) -> MessageType {
        self.body.message_type()
    }

    /// Decode one text frame.
    pub fn from_json(s: &str) -> Result<Self> {
        let wire: WireEnvelope = serde_json::from_str(s)
            .map_err(|e| ChatwireError::Malformed(format!("invalid envelope json: {e}")))?;
        Self::try_from(wire)
    }

    pub fn to_json(&self) -> Result<String> {
        let wire = WireEnvelope::try_from_envelope(self)?;
        serde_json::to_string(&wire)
            .map_err(|e| ChatwireError::Internal(format!("json encode failed: {e}")))
    }
}

impl TryFrom<WireEnvelope> for Envelope {
    type Error = ChatwireError;

    fn try_from(wire: WireEnvelope) -> Result<Self> {
        let message_type = MessageType::parse(&wire.message_type)
            .ok_or_else(|| ChatwireError::UnknownMessageType(wire.message_type.clone()))?;
        let body = Body::from_parts(message_type, wire.payload)?;
        Ok(Self {
            message_id: wire.message_id,
            sender: wire.sender,
            timestamp: wire.timestamp,
            body,
            metadata: wire.metadata,
            extensions: wire.extensions,
        })
    }
}

impl WireEnvelope {
    fn try_from_envelope(env: &Envelope) -> Result<Self> {
        Ok(Self {
            message_id: env.message_id.clone(),
            message_type: env.message_type().as_str().to_string(),
            sender: env.sender.clone(),
            timestamp: env.timestamp.clone(),
            payload: env.body.to_payload()?,
            metadata: env.metadata.clone(),
            extensions: env.extensions.clone(),
        })
    }
}

impl Serialize for Envelope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        WireEnvelope::try_from_envelope(self)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}
