//! Decode-once codec for the transport layer.
//!
//! - Text frames => `Envelope` (typed body), or `Unrecognized` for a
//!   well-formed frame whose `message_type` is outside the closed set
//! - Binary frames are surfaced by size only; the protocol has no binary lane
//! - Close frames are surfaced for lifecycle management

use chatwire_core::error::{ChatwireError, Result};
use chatwire_core::protocol::Envelope;

use super::{CloseInfo, WireFrame};

#[derive(Debug)]
pub enum Inbound {
    Envelope { env: Envelope, bytes_len: usize },
    Unrecognized { message_type: String },
    Binary { bytes_len: usize },
    Close(Option<CloseInfo>),
}

pub fn decode(frame: WireFrame) -> Result<Inbound> {
    match frame {
        WireFrame::Text(s) => {
            let bytes_len = s.len();
            match Envelope::from_json(&s) {
                Ok(env) => Ok(Inbound::Envelope { env, bytes_len }),
                Err(ChatwireError::UnknownMessageType(message_type)) => {
                    Ok(Inbound::Unrecognized { message_type })
                }
                Err(e) => Err(e),
            }
        }
        WireFrame::Binary(b) => Ok(Inbound::Binary { bytes_len: b.len() }),
        WireFrame::Close(info) => Ok(Inbound::Close(info)),
    }
}
