//! chatwire client library entry.
//!
//! This crate wires config, endpoint derivation, the transport seam, the
//! decode-once codec, and the listener registry into a stateful messaging
//! client. It is consumed by the CLI binary (`main.rs`) and integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod client;
pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod transport;

pub use client::{ConnectionState, MessageIds, MessagingClient, PendingConnect, SendOptions, TextKind};
pub use dispatch::{ClientEvent, DisconnectReason, ErrorEvent, EventKind, ListenerId};
