//! Transport layer (WebSocket).
//!
//! The client talks to the socket only through [`Connector`] / [`Connection`],
//! so the lifecycle logic is independent of the WebSocket implementation.
//! `ws` provides the tokio-tungstenite connector; `codec` decodes frames once
//! before they reach dispatch.

pub mod codec;
pub mod ws;

use async_trait::async_trait;

use chatwire_core::error::Result;

pub use ws::TungsteniteConnector;

/// Close status carried by a close frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

impl CloseInfo {
    pub const NORMAL: u16 = 1000;
    pub const NO_STATUS: u16 = 1005;
    pub const ABNORMAL: u16 = 1006;

    pub fn normal(reason: impl Into<String>) -> Self {
        Self { code: Self::NORMAL, reason: reason.into() }
    }

    pub fn abnormal(reason: impl Into<String>) -> Self {
        Self { code: Self::ABNORMAL, reason: reason.into() }
    }

    /// Close frame without a status code.
    pub fn no_status() -> Self {
        Self { code: Self::NO_STATUS, reason: String::new() }
    }

    pub fn is_normal(&self) -> bool {
        self.code == Self::NORMAL
    }
}

/// Frames exchanged with the transport. Ping/pong control frames are the
/// socket implementation's business and never surface here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireFrame {
    Text(String),
    Binary(Vec<u8>),
    Close(Option<CloseInfo>),
}

/// One open socket.
#[async_trait]
pub trait Connection: Send {
    async fn send(&mut self, frame: WireFrame) -> Result<()>;
    /// Next inbound frame; `None` once the stream has ended.
    async fn recv(&mut self) -> Option<Result<WireFrame>>;
}

/// Opens sockets. Resolves once the transport signals open.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self, url: &str) -> Result<Box<dyn Connection>>;
}
