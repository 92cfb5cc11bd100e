use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collection for the notification hub.
///
/// Plain atomic counters; a point-in-time [`MetricsSnapshot`] is rendered by
/// the `/metrics` endpoint.
#[derive(Debug, Default)]
pub struct ServerMetrics {
    // Connection metrics
    pub total_connections: AtomicU64,
    pub active_connections: AtomicU64,
    pub disconnections: AtomicU64,
    pub auth_failures: AtomicU64,

    // Delivery metrics
    pub events_delivered: AtomicU64,
    pub events_dropped: AtomicU64,
    pub frames_relayed: AtomicU64,
    pub malformed_frames: AtomicU64,
    pub unknown_kinds_dropped: AtomicU64,

    // Liveness metrics
    pub liveness_probes: AtomicU64,
    pub liveness_evictions: AtomicU64,
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_connections(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrement_active_connections(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn increment_disconnections(&self) {
        self.disconnections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_auth_failures(&self) {
        self.auth_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_events_delivered(&self) {
        self.events_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_events_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_frames_relayed(&self) {
        self.frames_relayed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_malformed_frames(&self) {
        self.malformed_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_unknown_kinds_dropped(&self) {
        self.unknown_kinds_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_liveness_probes(&self) {
        self.liveness_probes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_liveness_evictions(&self) {
        self.liveness_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            connections: ConnectionMetrics {
                total: self.total_connections.load(Ordering::Relaxed),
                active: self.active_connections.load(Ordering::Relaxed),
                disconnections: self.disconnections.load(Ordering::Relaxed),
                auth_failures: self.auth_failures.load(Ordering::Relaxed),
            },
            delivery: DeliveryMetrics {
                events_delivered: self.events_delivered.load(Ordering::Relaxed),
                events_dropped: self.events_dropped.load(Ordering::Relaxed),
                frames_relayed: self.frames_relayed.load(Ordering::Relaxed),
                malformed_frames: self.malformed_frames.load(Ordering::Relaxed),
                unknown_kinds_dropped: self.unknown_kinds_dropped.load(Ordering::Relaxed),
            },
            liveness: LivenessMetrics {
                probes_sent: self.liveness_probes.load(Ordering::Relaxed),
                evictions: self.liveness_evictions.load(Ordering::Relaxed),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub connections: ConnectionMetrics,
    pub delivery: DeliveryMetrics,
    pub liveness: LivenessMetrics,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConnectionMetrics {
    pub total: u64,
    pub active: u64,
    pub disconnections: u64,
    pub auth_failures: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeliveryMetrics {
    pub events_delivered: u64,
    pub events_dropped: u64,
    pub frames_relayed: u64,
    pub malformed_frames: u64,
    pub unknown_kinds_dropped: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LivenessMetrics {
    pub probes_sent: u64,
    pub evictions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_counters_track_registration_lifecycle() {
        let metrics = ServerMetrics::new();

        metrics.increment_connections();
        metrics.increment_connections();
        metrics.decrement_active_connections();
        metrics.increment_disconnections();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.connections.total, 2);
        assert_eq!(snapshot.connections.active, 1);
        assert_eq!(snapshot.connections.disconnections, 1);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let metrics = ServerMetrics::new();
        metrics.increment_events_delivered();
        metrics.increment_liveness_probes();

        let value = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(value["delivery"]["events_delivered"], 1);
        assert_eq!(value["liveness"]["probes_sent"], 1);
    }
}
