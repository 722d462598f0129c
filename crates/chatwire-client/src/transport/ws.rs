//! tokio-tungstenite connector.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use chatwire_core::error::{ChatwireError, Result};

use super::{CloseInfo, Connection, Connector, WireFrame};

#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn open(&self, url: &str) -> Result<Box<dyn Connection>> {
        let (stream, resp) = connect_async(url)
            .await
            .map_err(|e| ChatwireError::ConnectFailed(format!("{url}: {e}")))?;
        tracing::debug!(%url, status = %resp.status(), "websocket handshake complete");
        Ok(Box::new(WsConnection { stream }))
    }
}

struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connection for WsConnection {
    async fn send(&mut self, frame: WireFrame) -> Result<()> {
        self.stream
            .send(to_message(frame))
            .await
            .map_err(|e| ChatwireError::SendFailed(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<WireFrame>> {
        loop {
            let msg = match self.stream.next().await? {
                Ok(m) => m,
                Err(e) => {
                    return Some(Err(ChatwireError::Closed {
                        code: CloseInfo::ABNORMAL,
                        reason: e.to_string(),
                    }))
                }
            };

            match msg {
                Message::Text(s) => return Some(Ok(WireFrame::Text(s))),
                Message::Binary(b) => return Some(Ok(WireFrame::Binary(b))),
                Message::Close(frame) => {
                    return Some(Ok(WireFrame::Close(frame.map(|f| CloseInfo {
                        code: u16::from(f.code),
                        reason: f.reason.into_owned(),
                    }))))
                }
                // tungstenite answers pings on its own
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }
}

fn to_message(frame: WireFrame) -> Message {
    match frame {
        WireFrame::Text(s) => Message::Text(s),
        WireFrame::Binary(b) => Message::Binary(b),
        WireFrame::Close(info) => Message::Close(info.map(|i| CloseFrame {
            code: CloseCode::from(i.code),
            reason: i.reason.into(),
        })),
    }
}
