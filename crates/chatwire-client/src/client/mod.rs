//! Messaging transport client.
//!
//! One [`MessagingClient`] owns one logical connection to a room. Clones share
//! the same connection, listeners, and state. All methods return immediately;
//! failures surface through listener events or the `connect` result.

mod session;
mod state;
mod types;

use std::sync::Arc;

use serde_json::{json, Map};
use tokio::sync::mpsc::error::TrySendError;

use chatwire_core::error::{ChatwireError, Result};
use chatwire_core::protocol::ids::generate_user_id;
use chatwire_core::protocol::{Body, Envelope, ReadReceiptPayload, Sender, TextPayload, TypingPayload};

use crate::config::ClientConfig;
use crate::dispatch::{ClientEvent, ErrorEvent, EventKind, ListenerId};
use crate::transport::{Connector, TungsteniteConnector, WireFrame};

use state::Shared;
pub use types::{ConnectionState, MessageIds, PendingConnect, SendOptions, TextKind};

#[derive(Clone)]
pub struct MessagingClient {
    shared: Arc<Shared>,
}

impl MessagingClient {
    /// Client over a real WebSocket.
    pub fn new(cfg: ClientConfig) -> Result<Self> {
        Self::with_connector(cfg, Arc::new(TungsteniteConnector::new()))
    }

    /// Client over any transport.
    pub fn with_connector(cfg: ClientConfig, connector: Arc<dyn Connector>) -> Result<Self> {
        cfg.validate()?;
        let user_id = cfg.user_id.clone().unwrap_or_else(generate_user_id);
        let identity = Sender::user(user_id, cfg.username.clone());
        Ok(Self {
            shared: Arc::new(Shared::new(cfg, identity, connector)),
        })
    }

    // --------------------
    // Listeners
    // --------------------

    pub fn on<F>(&self, kind: EventKind, callback: F) -> ListenerId
    where
        F: Fn(&ClientEvent) + Send + Sync + 'static,
    {
        self.shared.listeners.on(kind, Arc::new(callback))
    }

    /// Register by event name (`"message"`, `"readReceipt"`, ...). Unknown
    /// names are ignored and return `None`.
    pub fn on_named<F>(&self, name: &str, callback: F) -> Option<ListenerId>
    where
        F: Fn(&ClientEvent) + Send + Sync + 'static,
    {
        let kind = EventKind::parse(name)?;
        Some(self.on(kind, callback))
    }

    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        self.shared.listeners.off(kind, id)
    }

    // --------------------
    // Lifecycle
    // --------------------

    /// Connect to `room`, replacing any current connection.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&self, room: impl Into<String>) -> PendingConnect {
        session::start(&self.shared, room.into())
    }

    /// Close the connection and permanently disable automatic reconnects.
    /// Idempotent.
    pub fn disconnect(&self) {
        let mut st = self.shared.lock();
        st.auto_reconnect = false;
        match st.phase {
            ConnectionState::Open => {
                // the connection task sends the close frame and reports `disconnect`
                st.phase = ConnectionState::Closing;
                st.outbound = None;
            }
            ConnectionState::Connecting => {
                st.generation += 1;
                st.phase = ConnectionState::Closed;
            }
            ConnectionState::Idle | ConnectionState::Closing | ConnectionState::Closed => {}
        }
        tracing::debug!(phase = ?st.phase, "disconnect requested");
    }

    // --------------------
    // Sending
    // --------------------

    /// Send a chat-family message. Returns the new message id, or `None`
    /// (after firing `error`) when not connected.
    pub fn send_message(&self, text: &str, options: SendOptions) -> Option<String> {
        let info = &self.shared.cfg.client_info;
        let mut metadata = Map::new();
        metadata.insert(
            "client_info".into(),
            json!({ "platform": info.platform, "device": info.device }),
        );
        metadata.extend(options.metadata);

        let mut payload = TextPayload::new(text, options.format.unwrap_or_else(|| "text".into()));
        payload.extra.extend(
            options
                .payload
                .into_iter()
                .filter(|(k, _)| k != "text" && k != "format"),
        );
        let body = match options.kind {
            TextKind::Chat => Body::Chat(payload),
            TextKind::AgentResponse => Body::AgentResponse(payload),
        };
        let env = Envelope::new(self.shared.identity.clone(), body).with_metadata(metadata);

        match transmit(&self.shared, &env, true) {
            Ok(()) => Some(env.message_id),
            Err(e) => {
                tracing::warn!(error = %e, "send_message failed");
                self.shared.emit(ClientEvent::Error(ErrorEvent::local(&e)));
                None
            }
        }
    }

    /// Best-effort typing indicator; ignored when not connected.
    pub fn send_typing_status(&self, remaining_text_length: u64) {
        let body = Body::Typing(TypingPayload::typing(remaining_text_length));
        send_signal(&self.shared, body);
    }

    /// Best-effort read receipt for one or more ids; ignored when not connected.
    pub fn send_read_receipt(&self, message_ids: impl Into<MessageIds>) {
        let body = Body::ReadReceipt(ReadReceiptPayload {
            message_ids: message_ids.into().into_vec(),
        });
        send_signal(&self.shared, body);
    }

    /// Liveness probe; ignored when not connected. The `pong` reply is absorbed.
    pub fn send_ping(&self) {
        send_ping(&self.shared);
    }

    // --------------------
    // Accessors
    // --------------------

    pub fn identity(&self) -> &Sender {
        &self.shared.identity
    }

    pub fn config(&self) -> &ClientConfig {
        &self.shared.cfg
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.lock().phase
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    pub fn room(&self) -> Option<String> {
        self.shared.lock().room.clone()
    }

    /// Session id from the last `connect_ack`; cleared on close.
    pub fn session_id(&self) -> Option<String> {
        self.shared.lock().session_id.clone()
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.lock().reconnect_attempts
    }

    /// Ids of every message sent through `send_message`, oldest first.
    pub fn sent_message_ids(&self) -> Vec<String> {
        self.shared.lock().sent_ids.clone()
    }
}

fn send_ping(shared: &Shared) {
    send_signal(shared, Body::Ping);
}

fn send_signal(shared: &Shared, body: Body) {
    let message_type = body.message_type();
    let env = Envelope::new(shared.identity.clone(), body);
    if let Err(e) = transmit(shared, &env, false) {
        tracing::trace!(%message_type, error = %e, "signal not sent");
    }
}

/// Queue one envelope on the open connection. Never waits.
fn transmit(shared: &Shared, env: &Envelope, record_id: bool) -> Result<()> {
    let text = env.to_json()?;

    let mut st = shared.lock();
    if st.phase != ConnectionState::Open {
        return Err(ChatwireError::NotConnected);
    }
    let tx = st.outbound.as_ref().ok_or(ChatwireError::NotConnected)?;
    tx.try_send(WireFrame::Text(text)).map_err(|e| match e {
        TrySendError::Full(_) => ChatwireError::SendFailed("outbound queue full".into()),
        TrySendError::Closed(_) => ChatwireError::NotConnected,
    })?;

    if record_id {
        st.sent_ids.push(env.message_id.clone());
    }
    Ok(())
}

