//! In-memory transport and event recorder shared by the client tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration, Instant};

use chatwire_client::config::ClientConfig;
use chatwire_client::transport::{CloseInfo, Connection, Connector, WireFrame};
use chatwire_client::{ClientEvent, ErrorEvent, EventKind, MessagingClient};
use chatwire_core::error::{ChatwireError, Result};

/// Outcome of the next `open` call.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Accept,
    Refuse,
}

/// Connector whose sockets are in-process channels. Each accepted open hands
/// the far end to the test as a [`Peer`].
pub struct MemoryConnector {
    script: Mutex<VecDeque<Step>>,
    opens: Mutex<Vec<(String, Instant)>>,
    sent: Arc<AtomicUsize>,
    peers: mpsc::UnboundedSender<Peer>,
}

impl MemoryConnector {
    /// Accepts every open unless scripted otherwise.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Peer>) {
        Self::scripted([])
    }

    pub fn scripted(
        steps: impl IntoIterator<Item = Step>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<Peer>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            script: Mutex::new(steps.into_iter().collect()),
            opens: Mutex::new(Vec::new()),
            sent: Arc::new(AtomicUsize::new(0)),
            peers: tx,
        });
        (connector, rx)
    }

    pub fn open_count(&self) -> usize {
        self.opens.lock().unwrap().len()
    }

    pub fn open_times(&self) -> Vec<Instant> {
        self.opens.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    /// Frames written by the client across every connection.
    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn open(&self, url: &str) -> Result<Box<dyn Connection>> {
        self.opens.lock().unwrap().push((url.to_string(), Instant::now()));
        let step = self.script.lock().unwrap().pop_front().unwrap_or(Step::Accept);
        match step {
            Step::Refuse => Err(ChatwireError::ConnectFailed("connection refused".into())),
            Step::Accept => {
                let (in_tx, in_rx) = mpsc::unbounded_channel();
                let (out_tx, out_rx) = mpsc::unbounded_channel();
                let _ = self.peers.send(Peer {
                    url: url.to_string(),
                    inbound: in_tx,
                    sent: out_rx,
                });
                Ok(Box::new(MemoryConnection {
                    inbound: in_rx,
                    sent: out_tx,
                    counter: Arc::clone(&self.sent),
                }))
            }
        }
    }
}

struct MemoryConnection {
    inbound: mpsc::UnboundedReceiver<WireFrame>,
    sent: mpsc::UnboundedSender<WireFrame>,
    counter: Arc<AtomicUsize>,
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn send(&mut self, frame: WireFrame) -> Result<()> {
        self.counter.fetch_add(1, Ordering::SeqCst);
        let _ = self.sent.send(frame);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<WireFrame>> {
        self.inbound.recv().await.map(Ok)
    }
}

/// Server side of one accepted connection. Dropping it ends the client's
/// stream without a close frame.
pub struct Peer {
    pub url: String,
    inbound: mpsc::UnboundedSender<WireFrame>,
    sent: mpsc::UnboundedReceiver<WireFrame>,
}

impl Peer {
    pub fn push_text(&self, text: impl Into<String>) {
        let _ = self.inbound.send(WireFrame::Text(text.into()));
    }

    pub fn push_json(&self, v: Value) {
        self.push_text(v.to_string());
    }

    pub fn push_binary(&self, bytes: Vec<u8>) {
        let _ = self.inbound.send(WireFrame::Binary(bytes));
    }

    pub fn close(&self, code: u16, reason: &str) {
        let _ = self.inbound.send(WireFrame::Close(Some(CloseInfo {
            code,
            reason: reason.to_string(),
        })));
    }

    pub fn close_without_status(&self) {
        let _ = self.inbound.send(WireFrame::Close(None));
    }

    pub async fn next_sent(&mut self) -> WireFrame {
        timeout(Duration::from_secs(60), self.sent.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("connection dropped")
    }

    /// Next client frame, decoded as JSON.
    pub async fn next_json(&mut self) -> Value {
        match self.next_sent().await {
            WireFrame::Text(s) => serde_json::from_str(&s).unwrap(),
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

pub async fn next_peer(peers: &mut mpsc::UnboundedReceiver<Peer>) -> Peer {
    timeout(Duration::from_secs(60), peers.recv())
        .await
        .expect("timed out waiting for a connection")
        .expect("connector dropped")
}

pub fn client_with(connector: &Arc<MemoryConnector>, cfg: ClientConfig) -> MessagingClient {
    let connector: Arc<dyn Connector> = connector.clone();
    MessagingClient::with_connector(cfg, connector).unwrap()
}

pub fn fast_config() -> ClientConfig {
    ClientConfig {
        user_id: Some("user_42".into()),
        username: "alice".into(),
        ..ClientConfig::default()
    }
}

/// Forward every event the client fires into a channel.
pub fn record(client: &MessagingClient) -> mpsc::UnboundedReceiver<ClientEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    for kind in EventKind::ALL {
        let tx = tx.clone();
        client.on(kind, move |e: &ClientEvent| {
            let _ = tx.send(e.clone());
        });
    }
    rx
}

pub async fn next_event(events: &mut mpsc::UnboundedReceiver<ClientEvent>) -> ClientEvent {
    timeout(Duration::from_secs(60), events.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("recorder dropped")
}

/// Next event, which must be `error`.
pub async fn expect_error(events: &mut mpsc::UnboundedReceiver<ClientEvent>) -> ErrorEvent {
    match next_event(events).await {
        ClientEvent::Error(e) => e,
        other => panic!("expected error, got {other:?}"),
    }
}

/// True when nothing arrives within a generous quiet period.
pub async fn no_event(events: &mut mpsc::UnboundedReceiver<ClientEvent>) -> bool {
    match timeout(Duration::from_secs(30), events.recv()).await {
        Err(_) => true,
        Ok(Some(e)) => panic!("unexpected event: {e:?}"),
        Ok(None) => true,
    }
}

pub fn chat_from(sender: &str, text: &str) -> Value {
    serde_json::json!({
        "message_id": format!("m-{text}"),
        "message_type": "chat",
        "sender": { "id": sender, "type": "user", "name": sender },
        "timestamp": "2024-05-01T12:00:00.000Z",
        "payload": { "text": text },
        "metadata": {}
    })
}
