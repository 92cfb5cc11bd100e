use std::sync::Arc;

use crate::protocol::{ConnectionId, ErrorCode, EventKind, EventMessage, UserId};

use super::NotificationHub;

impl NotificationHub {
    /// Dispatch one inbound text frame from a connection.
    ///
    /// Parse failures earn the sender (and only the sender) an `ERROR`
    /// reply. Sync kinds fan out to the user's other devices. Unrecognized
    /// kinds are dropped silently as a forward-compatibility allowance.
    pub fn route_inbound(&self, connection_id: &ConnectionId, user_id: &UserId, raw: &str) {
        let event = match serde_json::from_str::<EventMessage>(raw) {
            Ok(event) => event,
            Err(err) => {
                self.metrics().increment_malformed_frames();
                tracing::warn!(%connection_id, error = %err, "Rejecting malformed frame");
                self.deliver_to_connection(
                    connection_id,
                    EventMessage::error(
                        ErrorCode::MalformedMessage,
                        ErrorCode::MalformedMessage.description(),
                    ),
                );
                return;
            }
        };

        match event.kind {
            EventKind::HealthDataUpdate | EventKind::SyncStatusUpdate => {
                self.relay_to_siblings(connection_id, user_id, event);
            }
            EventKind::Unknown => {
                self.metrics().increment_unknown_kinds_dropped();
                tracing::debug!(%connection_id, "Dropping frame with unrecognized event kind");
            }
            kind => {
                tracing::debug!(
                    %connection_id,
                    %kind,
                    "Dropping server-originated event kind received from client"
                );
            }
        }
    }

    /// Fan a client-originated event out to every *other* connection owned
    /// by the same user, modeling multi-device synchronization. The sending
    /// connection is always excluded.
    fn relay_to_siblings(&self, origin: &ConnectionId, user_id: &UserId, event: EventMessage) {
        let event = Arc::new(event);
        let mut reached = 0usize;

        for (connection_id, sender) in self.registry().for_user(user_id) {
            if connection_id == *origin {
                continue;
            }
            self.dispatch(&connection_id, &sender, Arc::clone(&event));
            reached += 1;
        }

        self.metrics().increment_frames_relayed();
        tracing::debug!(%origin, %user_id, reached, "Relayed event to sibling connections");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::HubConfig;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn frame(kind: &str) -> String {
        json!({ "type": kind, "data": { "steps": 900 }, "timestamp": "2026-08-05T12:00:00Z" })
            .to_string()
    }

    #[tokio::test]
    async fn health_update_reaches_siblings_but_not_the_sender() {
        let hub = NotificationHub::new(HubConfig::default());
        let (tx1, mut rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        let c1 = hub.register_connection("u1".to_string(), tx1);
        let _c2 = hub.register_connection("u1".to_string(), tx2);

        hub.route_inbound(&c1, &"u1".to_string(), &frame("HEALTH_DATA_UPDATE"));

        let relayed = rx2.try_recv().expect("sibling receives the update");
        assert_eq!(
            relayed.as_event().expect("event frame").kind,
            EventKind::HealthDataUpdate
        );
        assert!(rx1.try_recv().is_err(), "sender must not receive an echo");
    }

    #[tokio::test]
    async fn sync_update_does_not_cross_user_boundaries() {
        let hub = NotificationHub::new(HubConfig::default());
        let (tx1, _rx1) = mpsc::channel(8);
        let (tx_other, mut rx_other) = mpsc::channel(8);
        let c1 = hub.register_connection("u1".to_string(), tx1);
        let _other = hub.register_connection("u2".to_string(), tx_other);

        hub.route_inbound(&c1, &"u1".to_string(), &frame("SYNC_STATUS_UPDATE"));

        assert!(rx_other.try_recv().is_err());
    }

    #[tokio::test]
    async fn malformed_frame_errors_only_the_sender() {
        let hub = NotificationHub::new(HubConfig::default());
        let (tx1, mut rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        let c1 = hub.register_connection("u1".to_string(), tx1);
        let _c2 = hub.register_connection("u1".to_string(), tx2);

        hub.route_inbound(&c1, &"u1".to_string(), "this is not json");

        let reply = rx1.try_recv().expect("sender gets an error reply");
        let event = reply.as_event().expect("event frame");
        assert_eq!(event.kind, EventKind::Error);
        assert_eq!(event.data["code"], "MALFORMED_MESSAGE");
        assert!(rx2.try_recv().is_err(), "parse failures are never broadcast");
    }

    #[tokio::test]
    async fn unknown_kind_is_dropped_silently() {
        let hub = NotificationHub::new(HubConfig::default());
        let (tx1, mut rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        let c1 = hub.register_connection("u1".to_string(), tx1);
        let _c2 = hub.register_connection("u1".to_string(), tx2);

        hub.route_inbound(&c1, &"u1".to_string(), &frame("SOME_FUTURE_KIND"));

        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_err());
        assert_eq!(hub.metrics().snapshot().delivery.unknown_kinds_dropped, 1);
    }

    #[tokio::test]
    async fn server_kinds_from_clients_are_not_relayed() {
        let hub = NotificationHub::new(HubConfig::default());
        let (tx1, _rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        let c1 = hub.register_connection("u1".to_string(), tx1);
        let _c2 = hub.register_connection("u1".to_string(), tx2);

        hub.route_inbound(&c1, &"u1".to_string(), &frame("ACHIEVEMENT_UNLOCKED"));
        hub.route_inbound(&c1, &"u1".to_string(), &frame("COACH_MESSAGE"));
        hub.route_inbound(&c1, &"u1".to_string(), &frame("ERROR"));

        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn relay_with_a_single_device_reaches_nobody() {
        let hub = NotificationHub::new(HubConfig::default());
        let (tx1, mut rx1) = mpsc::channel(8);
        let c1 = hub.register_connection("u1".to_string(), tx1);

        hub.route_inbound(&c1, &"u1".to_string(), &frame("HEALTH_DATA_UPDATE"));

        assert!(rx1.try_recv().is_err());
    }
}
