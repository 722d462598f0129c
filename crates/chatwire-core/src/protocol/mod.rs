//! Protocol modules.
//!
//! - `envelope`: the JSON envelope with a typed body keyed by `message_type`.
//! - `ids`: message id, default user id, and timestamp generation.
//!
//! Decoding is panic-free: malformed input is reported as `ChatwireError`
//! so the client's dispatch loop can log and drop it.

pub mod envelope;
pub mod ids;

pub use envelope::{
    Body, ConnectAckPayload, Envelope, ErrorPayload, MessageType, ReadReceiptPayload, Sender,
    SenderKind, TextPayload, TypingPayload, WireEnvelope,
};
