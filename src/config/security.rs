//! Security and authentication configuration types.

use super::defaults::{default_cors_origins, default_max_message_size, default_require_metrics_auth};
use serde::{Deserialize, Serialize};

/// Security configuration.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    /// Allowed CORS origins (comma-separated, or "*" for any)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    /// Shared secret used to verify HS256 bearer tokens at upgrade time.
    /// When unset, every WebSocket upgrade attempt is rejected; production
    /// startup fails validation without it.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// Maximum WebSocket message size in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Enable authentication for the metrics endpoint
    #[serde(default = "default_require_metrics_auth")]
    pub require_metrics_auth: bool,
    /// Authentication token for the metrics endpoint (if required)
    #[serde(default)]
    pub metrics_auth_token: Option<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: default_cors_origins(),
            jwt_secret: None,
            max_message_size: default_max_message_size(),
            require_metrics_auth: default_require_metrics_auth(),
            metrics_auth_token: None,
        }
    }
}
