//! chatwire core: transport-agnostic wire contracts for the room messaging protocol.
//!
//! This crate defines the envelope model, id/timestamp generation, and the
//! error surface shared by the client and any SDK tooling. It carries no
//! transport or runtime dependencies so it can be reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `ChatwireError`/`Result` so a client
//! never crashes on malformed input from the remote endpoint.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ChatwireError, ErrorCode, Result};
