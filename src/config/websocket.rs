//! WebSocket configuration types.

use super::defaults::default_send_queue_capacity;
use serde::{Deserialize, Serialize};

/// WebSocket configuration.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebSocketConfig {
    /// Capacity of the per-connection outbound queue. When a slow consumer
    /// fills its queue, further events for that connection are dropped
    /// rather than blocking the sender.
    #[serde(default = "default_send_queue_capacity")]
    pub send_queue_capacity: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            send_queue_capacity: default_send_queue_capacity(),
        }
    }
}

impl WebSocketConfig {
    /// Validate WebSocket configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.send_queue_capacity == 0 {
            anyhow::bail!("websocket.send_queue_capacity must be at least 1");
        }
        if self.send_queue_capacity > 4096 {
            anyhow::bail!(
                "websocket.send_queue_capacity must not exceed 4096 (configured: {})",
                self.send_queue_capacity
            );
        }
        Ok(())
    }
}
