//! Default value functions for configuration fields, used by serde's
//! `#[serde(default = ...)]` attributes throughout the configuration system.

use super::logging::LogFormat;

// =============================================================================
// Port & Root Config
// =============================================================================

pub const fn default_port() -> u16 {
    8080
}

// =============================================================================
// Server Defaults
// =============================================================================

/// Interval between liveness sweeps. A connection that fails to acknowledge
/// a probe within one further interval is evicted.
pub const fn default_heartbeat_interval_secs() -> u64 {
    30
}

// =============================================================================
// WebSocket Defaults
// =============================================================================

pub const fn default_send_queue_capacity() -> usize {
    64
}

// =============================================================================
// Security Defaults
// =============================================================================

pub fn default_cors_origins() -> String {
    "*".to_string()
}

pub const fn default_max_message_size() -> usize {
    65536 // 64KB
}

pub const fn default_require_metrics_auth() -> bool {
    false
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "hub.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub const fn default_enable_file_logging() -> bool {
    false
}

pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}
