//! Inbound routing table: envelope tag -> listener event.

use chatwire_core::protocol::{Body, Envelope, MessageType};

use super::event::{ClientEvent, ErrorEvent};

/// What the client does with one inbound envelope.
#[derive(Debug)]
pub enum Routed {
    /// Fire a listener event.
    Event(ClientEvent),
    /// `connect_ack`: remember the session id, nothing to fire.
    SessionAck(String),
    /// `pong`, or a `connect_ack` without a session id.
    Absorbed,
    /// A known tag the client does not handle inbound (e.g. `ping`).
    Dropped(MessageType),
}

pub fn route(env: Envelope) -> Routed {
    match &env.body {
        Body::ConnectAck(ack) if ack.session_id.is_empty() => Routed::Absorbed,
        Body::ConnectAck(ack) => Routed::SessionAck(ack.session_id.clone()),
        Body::Chat(_) | Body::AgentResponse(_) => Routed::Event(ClientEvent::Message(env)),
        Body::Typing(_) => Routed::Event(ClientEvent::Typing(env)),
        Body::ReadReceipt(_) => Routed::Event(ClientEvent::ReadReceipt(env)),
        Body::Error(_) => Routed::Event(ClientEvent::Error(ErrorEvent::remote(env))),
        Body::Pong => Routed::Absorbed,
        Body::Ping => Routed::Dropped(MessageType::Ping),
    }
}
