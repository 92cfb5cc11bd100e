//! Configuration module for Pulse Hub.
//!
//! Supports JSON configuration files, environment variable overrides, and
//! sensible compiled-in defaults.
//!
//! # Module Structure
//!
//! - [`types`]: Root `Config` struct
//! - [`server`]: Hub behavior configuration (heartbeat interval)
//! - [`websocket`]: WebSocket connection settings (send queue sizing)
//! - [`security`]: Token secret, CORS, message limits, metrics auth
//! - [`logging`]: Logging configuration
//! - [`loader`]: Configuration loading functions
//! - [`validation`]: Configuration validation functions
//! - [`defaults`]: Default value functions

pub mod defaults;
pub mod loader;
pub mod logging;
pub mod security;
pub mod server;
pub mod types;
pub mod validation;
pub mod websocket;

pub use loader::load;

pub use logging::{LogFormat, LogLevel, LoggingConfig};

pub use security::SecurityConfig;

pub use server::ServerConfig;

pub use types::Config;

pub use validation::{is_production_mode, validate_config_security};

pub use websocket::WebSocketConfig;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();

        assert_eq!(config.port, 8080);
        assert_eq!(config.server.heartbeat_interval_secs, 30);
        assert_eq!(config.websocket.send_queue_capacity, 64);
        assert_eq!(config.security.max_message_size, 65536);
        assert_eq!(config.security.cors_origins, "*");
        assert!(config.security.jwt_secret.is_none());
        assert!(!config.security.require_metrics_auth);

        assert_eq!(config.logging.dir, "logs");
        assert_eq!(config.logging.filename, "hub.log");
        assert_eq!(config.logging.rotation, "daily");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(config.port, deserialized.port);
        assert_eq!(
            config.server.heartbeat_interval_secs,
            deserialized.server.heartbeat_interval_secs
        );
        assert_eq!(
            config.websocket.send_queue_capacity,
            deserialized.websocket.send_queue_capacity
        );
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogLevel::Debug.to_string(), "debug");
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "port": 9000, "security": { "jwt_secret": "s" } }"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.security.jwt_secret.as_deref(), Some("s"));
        assert_eq!(config.server.heartbeat_interval_secs, 30);
    }
}
