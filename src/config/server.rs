//! Hub behavior configuration types.

use super::defaults::default_heartbeat_interval_secs;
use serde::{Deserialize, Serialize};

/// Server configuration for connection lifecycle management.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Interval between liveness sweeps (seconds). A probed connection that
    /// stays silent through the next sweep is evicted, so the effective
    /// dead-connection timeout is twice this value.
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
        }
    }
}
