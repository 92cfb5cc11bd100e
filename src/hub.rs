use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::auth::AuthGate;
use crate::metrics::ServerMetrics;
use crate::protocol::{ConnectionId, EventMessage, UserId};

mod delivery;
mod liveness;
mod registry;
mod router;

use registry::ConnectionRegistry;

/// A frame queued for a connection's write task.
///
/// Events are shared via `Arc` so a fan-out serializes the payload once per
/// target at write time without cloning the message itself.
#[derive(Debug, Clone)]
pub enum OutboundFrame {
    Event(Arc<EventMessage>),
    /// Liveness probe, written as a WebSocket Ping control frame.
    Ping,
}

impl OutboundFrame {
    pub fn as_event(&self) -> Option<&EventMessage> {
        match self {
            Self::Event(event) => Some(event),
            Self::Ping => None,
        }
    }
}

/// Runtime configuration for the hub, built from the loaded [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub heartbeat_interval: Duration,
    pub send_queue_capacity: usize,
    pub max_message_size: usize,
    pub jwt_secret: Option<String>,
    pub require_metrics_auth: bool,
    pub metrics_auth_token: Option<String>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(30),
            send_queue_capacity: 64,
            max_message_size: 65536,
            jwt_secret: None,
            require_metrics_auth: false,
            metrics_auth_token: None,
        }
    }
}

/// The notification hub: one shared registry of live authenticated
/// connections, a liveness monitor sweeping it, and the routing primitives
/// that fan events out to the right subset of connections.
///
/// All state is owned here and passed by `Arc` to every component; there is
/// no ambient module-level state. `start` and `shutdown` bracket the
/// background monitor deterministically.
pub struct NotificationHub {
    registry: ConnectionRegistry,
    auth_gate: AuthGate,
    config: HubConfig,
    metrics: Arc<ServerMetrics>,
    shutdown_token: CancellationToken,
    monitor_task: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationHub {
    pub fn new(config: HubConfig) -> Arc<Self> {
        let auth_gate = AuthGate::new(config.jwt_secret.as_deref());

        Arc::new(Self {
            registry: ConnectionRegistry::new(),
            auth_gate,
            config,
            metrics: Arc::new(ServerMetrics::new()),
            shutdown_token: CancellationToken::new(),
            monitor_task: Mutex::new(None),
        })
    }

    /// Spawn the liveness monitor. Idempotent only in the sense that callers
    /// are expected to invoke it once, right after construction.
    pub fn start(self: &Arc<Self>) {
        let hub = Arc::clone(self);
        let handle = tokio::spawn(async move { hub.liveness_task().await });
        if let Ok(mut slot) = self.monitor_task.lock() {
            *slot = Some(handle);
        }
    }

    /// Stop the liveness monitor and close every open connection.
    ///
    /// Dropping a connection's send queue ends its write task, which closes
    /// the underlying socket, so draining the registry is sufficient to tear
    /// down all transports.
    pub async fn shutdown(&self) {
        self.shutdown_token.cancel();

        let task = self
            .monitor_task
            .lock()
            .ok()
            .and_then(|mut slot| slot.take());
        if let Some(task) = task {
            let _ = task.await;
        }

        let closed = self.registry.drain();
        tracing::info!(closed_connections = closed, "Notification hub shut down");
    }

    /// Admit an authenticated connection to the registry.
    ///
    /// The returned id is the connection's identity for its whole lifetime;
    /// the user id attached to it never changes afterwards.
    pub fn register_connection(
        &self,
        user_id: UserId,
        sender: mpsc::Sender<OutboundFrame>,
    ) -> ConnectionId {
        let connection_id = self.registry.register(user_id.clone(), sender);
        self.metrics.increment_connections();
        tracing::info!(%connection_id, %user_id, "Connection registered");
        connection_id
    }

    /// Remove a connection and release its transport handle.
    ///
    /// Idempotent: unregistering an id that is absent (already evicted,
    /// already torn down) is a no-op.
    pub fn unregister_connection(&self, connection_id: &ConnectionId) {
        if let Some(user_id) = self.registry.unregister(connection_id) {
            self.metrics.decrement_active_connections();
            self.metrics.increment_disconnections();
            tracing::info!(%connection_id, %user_id, "Connection unregistered");
        }
    }

    /// Reset a connection to `Alive` on receipt of an acknowledgment frame.
    pub fn record_ack(&self, connection_id: &ConnectionId) {
        self.registry.record_ack(connection_id);
    }

    /// Refresh a connection's last-activity timestamp.
    pub fn record_activity(&self, connection_id: &ConnectionId) {
        self.registry.touch(connection_id);
    }

    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }

    pub fn user_count(&self) -> usize {
        self.registry.user_count()
    }

    /// Number of live connections held by one user.
    pub fn user_connection_count(&self, user_id: &UserId) -> usize {
        self.registry.for_user(user_id).len()
    }

    pub fn auth_gate(&self) -> &AuthGate {
        &self.auth_gate
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<ServerMetrics> {
        self.metrics.clone()
    }

    pub async fn health_check(&self) -> bool {
        !self.shutdown_token.is_cancelled()
    }

    pub(crate) fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }
}
