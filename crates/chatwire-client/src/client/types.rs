use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use serde_json::{Map, Value};
use tokio::sync::oneshot;

use chatwire_core::error::{ChatwireError, Result};

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closing,
    Closed,
}

/// Chat-family tag for `send_message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextKind {
    #[default]
    Chat,
    AgentResponse,
}

/// Options for `send_message`.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Payload format; `"text"` when unset.
    pub format: Option<String>,
    pub kind: TextKind,
    /// Merged over the base `client_info` metadata. Caller keys win.
    pub metadata: Map<String, Value>,
    /// Extra payload fields (`group_id`, `reply_to`, ...). `text` and
    /// `format` are owned by the send call and ignored here.
    pub payload: Map<String, Value>,
}

impl SendOptions {
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn kind(mut self, kind: TextKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn payload(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }
}

/// One or more message ids, normalized to a list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageIds(pub Vec<String>);

impl MessageIds {
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for MessageIds {
    fn from(id: &str) -> Self {
        Self(vec![id.to_string()])
    }
}

impl From<String> for MessageIds {
    fn from(id: String) -> Self {
        Self(vec![id])
    }
}

impl From<Vec<String>> for MessageIds {
    fn from(ids: Vec<String>) -> Self {
        Self(ids)
    }
}

impl From<Vec<&str>> for MessageIds {
    fn from(ids: Vec<&str>) -> Self {
        Self(ids.into_iter().map(str::to_string).collect())
    }
}

impl From<&[String]> for MessageIds {
    fn from(ids: &[String]) -> Self {
        Self(ids.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for MessageIds {
    fn from(ids: [&str; N]) -> Self {
        Self(ids.into_iter().map(str::to_string).collect())
    }
}

/// Result of `connect`. Settles once: `Ok` when the socket opens, `Err` when
/// the attempt fails, closes first, or is superseded by a newer `connect`.
///
/// Dropping it does not cancel the attempt.
#[derive(Debug)]
pub struct PendingConnect {
    rx: oneshot::Receiver<Result<()>>,
}

impl PendingConnect {
    pub(crate) fn new(rx: oneshot::Receiver<Result<()>>) -> Self {
        Self { rx }
    }

    /// Already-settled failure.
    pub(crate) fn failed(err: ChatwireError) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Err(err));
        Self { rx }
    }
}

impl Future for PendingConnect {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|settled| {
            settled.unwrap_or_else(|_| {
                Err(ChatwireError::Internal("connection task dropped".into()))
            })
        })
    }
}
