//! Lobby relay configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lobby relay (WebSocket pairing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Seconds between two sweeps of empty lobbies.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Route of the WebSocket endpoint.
    #[serde(default = "default_ws_path")]
    pub ws_path: String,
    /// Query parameter carrying the lobby ID.
    #[serde(default = "default_lobby_query_param")]
    pub lobby_query_param: String,
    /// Largest WebSocket message accepted from a client, in bytes.
    /// Unset leaves the transport's own limit in place.
    #[serde(default)]
    pub max_frame_bytes: Option<usize>,
    /// Outbound frames buffered per connection. A connection whose
    /// buffer fills up is dropped as a disconnect.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
}

impl RelayConfig {
    /// Sweep interval as a [`Duration`]. Never zero.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds.max(1))
    }

    /// Outbound buffer capacity. Always room for an error frame and a close.
    pub fn channel_capacity(&self) -> usize {
        self.channel_buffer_size.max(2)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: default_sweep_interval(),
            ws_path: default_ws_path(),
            lobby_query_param: default_lobby_query_param(),
            max_frame_bytes: None,
            channel_buffer_size: default_channel_buffer(),
        }
    }
}

fn default_sweep_interval() -> u64 {
    5
}

fn default_ws_path() -> String {
    "/ws".to_string()
}

fn default_lobby_query_param() -> String {
    "lobby".to_string()
}

fn default_channel_buffer() -> usize {
    256
}
