//! Top-level facade crate for chatwire.
//!
//! Re-exports the protocol types and the messaging client so users can depend on a single crate.

pub mod core {
    pub use chatwire_core::*;
}

pub mod client {
    pub use chatwire_client::*;
}

pub use chatwire_client::{ClientEvent, EventKind, MessagingClient, SendOptions};
