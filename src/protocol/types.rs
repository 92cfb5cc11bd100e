use uuid::Uuid;

/// Unique identifier for a live connection, assigned by the registry.
pub type ConnectionId = Uuid;

/// User identity extracted from a verified token's `sub` claim.
///
/// Immutable for the lifetime of a connection; one user may hold any number
/// of concurrent connections (multi-device, multi-tab).
pub type UserId = String;

/// Per-connection liveness state machine.
///
/// Transitions: `Alive -> AwaitingAck` when the monitor sends a probe,
/// `AwaitingAck -> Alive` on receipt of an acknowledgment frame, and
/// `AwaitingAck -> Evicted` when a second sweep finds the previous probe
/// still unanswered. `Evicted` is terminal; the connection is removed from
/// the registry immediately after entering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessState {
    Alive,
    AwaitingAck,
    Evicted,
}
