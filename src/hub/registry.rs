use std::time::Instant;

use dashmap::DashMap;
use smallvec::SmallVec;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::protocol::{ConnectionId, LivenessState, UserId};

use super::OutboundFrame;

/// A live authenticated connection. Exclusively owned by the registry from
/// registration to teardown; everything else works with cloned senders.
#[derive(Debug)]
pub(crate) struct ClientConnection {
    pub user_id: UserId,
    pub sender: mpsc::Sender<OutboundFrame>,
    pub liveness: LivenessState,
    pub last_activity: Instant,
}

/// Tracks live connections keyed by registry-assigned id, with a secondary
/// index from user id to that user's connections (most users hold one or
/// two devices, hence the inline `SmallVec`).
///
/// All operations are safe under concurrent invocation from per-connection
/// tasks plus the liveness monitor. Lookups and iteration produce snapshots
/// of cloned senders, so message sending never happens under a map guard and
/// never blocks registry bookkeeping on a slow socket.
#[derive(Default)]
pub(crate) struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ClientConnection>,
    user_index: DashMap<UserId, SmallVec<[ConnectionId; 2]>>,
}

/// Result of one liveness sweep over the registry.
pub(crate) struct SweepOutcome {
    /// Connections that were `Alive` and are now `AwaitingAck`; each needs a probe.
    pub probes: Vec<(ConnectionId, mpsc::Sender<OutboundFrame>)>,
    /// Connections that never acknowledged the previous probe, now `Evicted`.
    pub evicted: Vec<ConnectionId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, user_id: UserId, sender: mpsc::Sender<OutboundFrame>) -> ConnectionId {
        let connection_id = Uuid::new_v4();
        self.connections.insert(
            connection_id,
            ClientConnection {
                user_id: user_id.clone(),
                sender,
                liveness: LivenessState::Alive,
                last_activity: Instant::now(),
            },
        );
        self.user_index.entry(user_id).or_default().push(connection_id);
        connection_id
    }

    /// Remove a connection, returning its user id. Absent ids are a no-op.
    pub fn unregister(&self, connection_id: &ConnectionId) -> Option<UserId> {
        let (_, connection) = self.connections.remove(connection_id)?;

        if let Some(mut entry) = self.user_index.get_mut(&connection.user_id) {
            entry.retain(|id| id != connection_id);
        }
        self.user_index
            .remove_if(&connection.user_id, |_, ids| ids.is_empty());

        Some(connection.user_id)
    }

    /// Snapshot of one user's connections (possibly empty).
    pub fn for_user(&self, user_id: &UserId) -> Vec<(ConnectionId, mpsc::Sender<OutboundFrame>)> {
        let Some(ids) = self.user_index.get(user_id).map(|entry| entry.value().clone()) else {
            return Vec::new();
        };

        ids.iter()
            .filter_map(|id| {
                self.connections
                    .get(id)
                    .map(|conn| (*id, conn.sender.clone()))
            })
            .collect()
    }

    /// Snapshot of every live connection.
    pub fn for_all(&self) -> Vec<(ConnectionId, mpsc::Sender<OutboundFrame>)> {
        self.connections
            .iter()
            .map(|entry| (*entry.key(), entry.sender.clone()))
            .collect()
    }

    pub fn sender_for(&self, connection_id: &ConnectionId) -> Option<mpsc::Sender<OutboundFrame>> {
        self.connections
            .get(connection_id)
            .map(|conn| conn.sender.clone())
    }

    /// Reset liveness to `Alive` on receipt of an acknowledgment frame.
    pub fn record_ack(&self, connection_id: &ConnectionId) {
        if let Some(mut conn) = self.connections.get_mut(connection_id) {
            conn.liveness = LivenessState::Alive;
            conn.last_activity = Instant::now();
        }
    }

    pub fn touch(&self, connection_id: &ConnectionId) {
        if let Some(mut conn) = self.connections.get_mut(connection_id) {
            conn.last_activity = Instant::now();
        }
    }

    pub fn liveness(&self, connection_id: &ConnectionId) -> Option<LivenessState> {
        self.connections.get(connection_id).map(|conn| conn.liveness)
    }

    /// Time since the connection last showed any inbound activity.
    pub fn idle_for(&self, connection_id: &ConnectionId) -> Option<std::time::Duration> {
        self.connections
            .get(connection_id)
            .map(|conn| conn.last_activity.elapsed())
    }

    /// One pass of the liveness state machine over every connection.
    ///
    /// Connections still `AwaitingAck` from the previous probe are marked
    /// `Evicted` and returned for removal; everything else is marked
    /// `AwaitingAck` and returned for probing. Eviction itself happens via
    /// `unregister` after iteration, never while holding map guards.
    pub fn collect_liveness_transitions(&self) -> SweepOutcome {
        let mut probes = Vec::new();
        let mut evicted = Vec::new();

        for mut entry in self.connections.iter_mut() {
            match entry.liveness {
                LivenessState::AwaitingAck => {
                    entry.liveness = LivenessState::Evicted;
                    evicted.push(*entry.key());
                }
                LivenessState::Alive => {
                    entry.liveness = LivenessState::AwaitingAck;
                    probes.push((*entry.key(), entry.sender.clone()));
                }
                LivenessState::Evicted => {}
            }
        }

        SweepOutcome { probes, evicted }
    }

    /// Remove every connection, dropping all senders so write tasks close
    /// their transports. Returns the number of connections removed.
    pub fn drain(&self) -> usize {
        let count = self.connections.len();
        self.connections.clear();
        self.user_index.clear();
        count
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn user_count(&self) -> usize {
        self.user_index.len()
    }
}
