//! Dispatch module exports.
//!
//! Event types, the listener registry, and the inbound routing table.

pub mod event;
pub mod inbound;
pub mod listeners;

pub use event::{ClientEvent, DisconnectReason, ErrorEvent, EventKind};
pub use inbound::{route, Routed};
pub use listeners::{Callback, ListenerId, Listeners};
