use serde::Deserialize;
use chatwire_core::error::{ChatwireError, Result};

use crate::endpoint;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Local identity; a random `user_<n>` is generated when absent.
    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default = "default_username")]
    pub username: String,

    /// Origin the messaging endpoint is derived from (`http(s)://host[:port]`).
    #[serde(default = "default_origin")]
    pub origin: String,

    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    #[serde(default = "default_auto_reconnect")]
    pub auto_reconnect: bool,

    /// 0 disables the client heartbeat.
    #[serde(default)]
    pub ping_interval_ms: u64,

    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,

    #[serde(default)]
    pub client_info: ClientInfo,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_id: None,
            username: default_username(),
            origin: default_origin(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            auto_reconnect: default_auto_reconnect(),
            ping_interval_ms: 0,
            outbound_buffer: default_outbound_buffer(),
            client_info: ClientInfo::default(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(ChatwireError::InvalidConfig("username must not be empty".into()));
        }
        if matches!(&self.user_id, Some(id) if id.trim().is_empty()) {
            return Err(ChatwireError::InvalidConfig("user_id must not be empty".into()));
        }
        if self.max_reconnect_attempts > 100 {
            return Err(ChatwireError::InvalidConfig(
                "max_reconnect_attempts must be at most 100".into(),
            ));
        }
        if !(100..=600_000).contains(&self.reconnect_interval_ms) {
            return Err(ChatwireError::InvalidConfig(
                "reconnect_interval_ms must be between 100 and 600000".into(),
            ));
        }
        if self.ping_interval_ms != 0 && !(1000..=600_000).contains(&self.ping_interval_ms) {
            return Err(ChatwireError::InvalidConfig(
                "ping_interval_ms must be 0 or between 1000 and 600000".into(),
            ));
        }
        if !(1..=65_536).contains(&self.outbound_buffer) {
            return Err(ChatwireError::InvalidConfig(
                "outbound_buffer must be between 1 and 65536".into(),
            ));
        }

        endpoint::split_origin(&self.origin)?;
        self.client_info.validate()?;

        Ok(())
    }
}

/// Values stamped into `metadata.client_info` on chat-family sends.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientInfo {
    #[serde(default = "default_platform")]
    pub platform: String,

    #[serde(default = "default_device")]
    pub device: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            platform: default_platform(),
            device: default_device(),
        }
    }
}

impl ClientInfo {
    pub fn validate(&self) -> Result<()> {
        if self.platform.is_empty() || self.device.is_empty() {
            return Err(ChatwireError::InvalidConfig(
                "client_info.platform and client_info.device must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_username() -> String {
    "Guest".into()
}
fn default_origin() -> String {
    "http://localhost:8000".into()
}
fn default_max_reconnect_attempts() -> u32 {
    5
}
fn default_reconnect_interval_ms() -> u64 {
    3000
}
fn default_auto_reconnect() -> bool {
    true
}
fn default_outbound_buffer() -> usize {
    256
}
fn default_platform() -> String {
    "web".into()
}
fn default_device() -> String {
    "browser".into()
}
