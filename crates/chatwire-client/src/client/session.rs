//! Connection task.
//!
//! Responsibilities:
//! - Open the transport for one attempt and settle the caller's `PendingConnect`
//! - Writer/reader loop: drain the outbound queue, decode-once inbound frames, route them
//! - Optional heartbeat ping
//! - Classify the close and schedule at most one retry per abnormal close
//!
//! Every attempt carries a generation number. Once a newer `connect` (or a
//! `disconnect` during connecting) bumps the shared generation, the older task
//! stops touching shared state and ends without emitting events.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, Instant, Interval, MissedTickBehavior};

use chatwire_core::error::{ChatwireError, Result};
use chatwire_core::protocol::Envelope;

use crate::dispatch::{route, ClientEvent, DisconnectReason, ErrorEvent, Routed};
use crate::endpoint;
use crate::transport::codec::{decode, Inbound};
use crate::transport::{CloseInfo, Connection, WireFrame};

use super::state::{SessionState, Shared};
use super::types::{ConnectionState, PendingConnect};

/// How the read/write loop ended.
#[derive(Debug)]
enum Closure {
    /// Outbound queue dropped: `disconnect()` or a superseding `connect()`.
    Local,
    Remote(CloseInfo),
    /// The transport never opened.
    OpenFailed(ChatwireError),
}

/// Begin one connection attempt for `room`.
pub(crate) fn start(shared: &Arc<Shared>, room: String) -> PendingConnect {
    let url = match endpoint::messaging_url(&shared.cfg.origin, &room) {
        Ok(url) => url,
        Err(e) => return PendingConnect::failed(e),
    };

    let (generation, replaced_open) = {
        let mut st = shared.lock();
        let replaced_open = matches!(st.phase, ConnectionState::Open | ConnectionState::Closing);
        (st.begin_attempt(&room), replaced_open)
    };

    // The replaced task is no longer current and will end quietly.
    if replaced_open {
        shared.emit(ClientEvent::Disconnect(DisconnectReason::Requested));
    }

    let (settle_tx, settle_rx) = oneshot::channel();
    tokio::spawn(run(Arc::clone(shared), generation, room, url, settle_tx));
    PendingConnect::new(settle_rx)
}

async fn run(
    shared: Arc<Shared>,
    generation: u64,
    room: String,
    url: String,
    settle: oneshot::Sender<Result<()>>,
) {
    tracing::info!(%room, %url, generation, "connecting");

    let mut conn = match shared.connector.open(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            if !shared.is_current(generation) {
                let _ = settle.send(Err(ChatwireError::Superseded));
                return;
            }
            on_closed(&shared, generation, room, Closure::OpenFailed(e.clone()));
            let _ = settle.send(Err(e));
            return;
        }
    };

    let (out_tx, out_rx) = mpsc::channel::<WireFrame>(shared.cfg.outbound_buffer);
    let opened = {
        let mut st = shared.lock();
        if st.generation == generation {
            st.mark_open(out_tx);
            true
        } else {
            false
        }
    };

    if !opened {
        tracing::debug!(%room, generation, "attempt superseded before open");
        let _ = conn
            .send(WireFrame::Close(Some(CloseInfo::normal("superseded"))))
            .await;
        let _ = settle.send(Err(ChatwireError::Superseded));
        return;
    }

    tracing::info!(%room, generation, "connected");
    shared.emit(ClientEvent::Connect { room: room.clone() });
    let _ = settle.send(Ok(()));

    let closure = drive(&shared, generation, conn.as_mut(), out_rx).await;
    on_closed(&shared, generation, room, closure);
}

async fn drive(
    shared: &Arc<Shared>,
    generation: u64,
    conn: &mut dyn Connection,
    mut out_rx: mpsc::Receiver<WireFrame>,
) -> Closure {
    let mut heartbeat = heartbeat(shared.cfg.ping_interval_ms);

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                match maybe_out {
                    Some(frame) => {
                        if let Err(e) = conn.send(frame).await {
                            tracing::warn!(error = %e, "write failed");
                            return Closure::Remote(CloseInfo::abnormal(e.to_string()));
                        }
                    }
                    None => {
                        let _ = conn
                            .send(WireFrame::Close(Some(CloseInfo::normal("client disconnect"))))
                            .await;
                        return Closure::Local;
                    }
                }
            }

            // inbound reader
            incoming = conn.recv() => {
                let frame = match incoming {
                    Some(Ok(frame)) => frame,
                    Some(Err(e)) => return Closure::Remote(CloseInfo::abnormal(e.to_string())),
                    None => return Closure::Remote(CloseInfo::abnormal("stream ended")),
                };

                match decode(frame) {
                    Ok(Inbound::Envelope { env, bytes_len }) => {
                        tracing::debug!(message_type = %env.message_type(), bytes_len, "inbound envelope");
                        dispatch(shared, generation, env);
                    }
                    Ok(Inbound::Unrecognized { message_type }) => {
                        tracing::info!(%message_type, "unhandled message type; dropped");
                    }
                    Ok(Inbound::Binary { bytes_len }) => {
                        tracing::debug!(bytes_len, "binary frame dropped");
                    }
                    Ok(Inbound::Close(info)) => {
                        return Closure::Remote(info.unwrap_or_else(CloseInfo::no_status));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "malformed frame dropped");
                    }
                }
            }

            // heartbeat
            _ = tick(&mut heartbeat) => {
                super::send_ping(shared);
            }
        }
    }
}

fn dispatch(shared: &Shared, generation: u64, env: Envelope) {
    match route(env) {
        Routed::Event(event) => {
            if shared.is_current(generation) {
                shared.emit(event);
            }
        }
        Routed::SessionAck(session_id) => {
            let mut st = shared.lock();
            if st.generation == generation {
                tracing::debug!(%session_id, "session acknowledged");
                st.session_id = Some(session_id);
            }
        }
        Routed::Absorbed => tracing::trace!("absorbed"),
        Routed::Dropped(message_type) => {
            tracing::debug!(%message_type, "no inbound handler; dropped");
        }
    }
}

fn on_closed(shared: &Arc<Shared>, generation: u64, room: String, closure: Closure) {
    let max = shared.cfg.max_reconnect_attempts;

    let (error, reason, retry) = {
        let mut st = shared.lock();
        if st.generation != generation {
            tracing::debug!(%room, generation, "stale connection closed");
            return;
        }
        st.mark_closed();

        match closure {
            Closure::Local => (None, DisconnectReason::Requested, false),
            Closure::Remote(info) if info.is_normal() => (
                None,
                DisconnectReason::ClosedByPeer { code: info.code, reason: info.reason },
                false,
            ),
            Closure::Remote(info) => {
                let err = ChatwireError::Closed { code: info.code, reason: info.reason.clone() };
                let (reason, retry) = classify_abnormal(&st, max, info);
                (Some(err), reason, retry)
            }
            Closure::OpenFailed(err) => {
                let (reason, retry) = classify_abnormal(&st, max, CloseInfo::abnormal(err.to_string()));
                (Some(err), reason, retry)
            }
        }
    };

    // abnormal endings report `error` ahead of `disconnect`
    if let Some(err) = &error {
        tracing::warn!(%room, error = %err, "connection failed");
        shared.emit(ClientEvent::Error(ErrorEvent::local(err)));
    }

    match &reason {
        DisconnectReason::RetriesExhausted { attempts, .. } => {
            tracing::warn!(%room, attempts, "reconnect attempts exhausted");
        }
        other => tracing::info!(%room, reason = ?other, "disconnected"),
    }
    shared.emit(ClientEvent::Disconnect(reason));

    if retry {
        schedule_retry(shared, generation, room);
    }
}

fn classify_abnormal(st: &SessionState, max: u32, info: CloseInfo) -> (DisconnectReason, bool) {
    let CloseInfo { code, reason } = info;
    if !st.auto_reconnect {
        (DisconnectReason::Lost { code, reason, will_retry: false }, false)
    } else if st.reconnect_attempts < max {
        (DisconnectReason::Lost { code, reason, will_retry: true }, true)
    } else {
        (
            DisconnectReason::RetriesExhausted { attempts: st.reconnect_attempts, code, reason },
            false,
        )
    }
}

/// Fire-once retry. Checked again at fire time: a `disconnect()` or a newer
/// `connect()` in the meantime cancels it.
fn schedule_retry(shared: &Arc<Shared>, generation: u64, room: String) {
    let delay = Duration::from_millis(shared.cfg.reconnect_interval_ms);
    let shared = Arc::clone(shared);

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let attempt = {
            let mut st = shared.lock();
            if !st.auto_reconnect || st.generation != generation {
                tracing::debug!(%room, "pending reconnect suppressed");
                return;
            }
            st.reconnect_attempts += 1;
            st.reconnect_attempts
        };

        tracing::info!(%room, attempt, max = shared.cfg.max_reconnect_attempts, "reconnecting");
        // outcome is reported through events
        drop(start(&shared, room));
    });
}

fn heartbeat(ping_interval_ms: u64) -> Option<Interval> {
    if ping_interval_ms == 0 {
        return None;
    }
    let every = Duration::from_millis(ping_interval_ms);
    let mut iv = tokio::time::interval_at(Instant::now() + every, every);
    iv.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(iv)
}

async fn tick(heartbeat: &mut Option<Interval>) {
    match heartbeat {
        Some(iv) => {
            iv.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
