#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

//! # Pulse Hub
//!
//! A lightweight, in-memory WebSocket notification hub for real-time health
//! data synchronization.
//!
//! Clients connect over a single authenticated WebSocket; the hub tracks
//! their liveness and routes event messages between a user's devices and to
//! service-triggered pushes. No database, no message broker; all state
//! lives in process memory.

/// Token verification at upgrade time
pub mod auth;

/// Server configuration and environment variables
pub mod config;

/// Connection registry, liveness monitor and message router
pub mod hub;

/// Structured logging configuration
pub mod logging;

/// Metrics collection and reporting
pub mod metrics;

/// Wire envelope and event kind definitions
pub mod protocol;

/// WebSocket connection handling
pub mod websocket;
