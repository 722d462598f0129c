use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use chatwire_core::protocol::Sender;

use crate::config::ClientConfig;
use crate::dispatch::{ClientEvent, Listeners};
use crate::transport::{Connector, WireFrame};

use super::types::ConnectionState;

/// Mutable per-client record. Locked briefly; never held across `.await`
/// or while listeners run.
#[derive(Debug)]
pub(crate) struct SessionState {
    pub phase: ConnectionState,
    pub room: Option<String>,
    pub session_id: Option<String>,
    pub reconnect_attempts: u32,
    pub auto_reconnect: bool,
    /// Bumped by every `connect` and by `disconnect` while connecting.
    /// Connection tasks act on shared state only while their generation is current.
    pub generation: u64,
    /// Writer queue of the open connection. Dropping it closes the socket.
    pub outbound: Option<mpsc::Sender<WireFrame>>,
    pub sent_ids: Vec<String>,
}

impl SessionState {
    fn new(auto_reconnect: bool) -> Self {
        Self {
            phase: ConnectionState::Idle,
            room: None,
            session_id: None,
            reconnect_attempts: 0,
            auto_reconnect,
            generation: 0,
            outbound: None,
            sent_ids: Vec::new(),
        }
    }

    /// Start a new attempt, retiring whatever connection was current.
    pub fn begin_attempt(&mut self, room: &str) -> u64 {
        self.generation += 1;
        self.outbound = None;
        self.session_id = None;
        self.room = Some(room.to_string());
        self.phase = ConnectionState::Connecting;
        self.generation
    }

    pub fn mark_open(&mut self, outbound: mpsc::Sender<WireFrame>) {
        self.phase = ConnectionState::Open;
        self.reconnect_attempts = 0;
        self.outbound = Some(outbound);
    }

    pub fn mark_closed(&mut self) {
        self.phase = ConnectionState::Closed;
        self.outbound = None;
        self.session_id = None;
    }
}

pub(crate) struct Shared {
    pub cfg: ClientConfig,
    pub identity: Sender,
    pub connector: Arc<dyn Connector>,
    pub listeners: Listeners,
    state: Mutex<SessionState>,
}

impl Shared {
    pub fn new(cfg: ClientConfig, identity: Sender, connector: Arc<dyn Connector>) -> Self {
        let state = Mutex::new(SessionState::new(cfg.auto_reconnect));
        Self {
            cfg,
            identity,
            connector,
            listeners: Listeners::new(),
            state,
        }
    }

    /// A panicking listener never runs under this lock, so poisoning only
    /// means a bug elsewhere; keep serving the inner state.
    pub fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    pub fn emit(&self, event: ClientEvent) {
        self.listeners.emit(&event);
    }
}
