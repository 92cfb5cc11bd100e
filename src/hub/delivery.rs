use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::protocol::{ConnectionId, EventMessage, UserId};

use super::{NotificationHub, OutboundFrame};

impl NotificationHub {
    /// Fan an event out to every live connection of one user.
    ///
    /// Best-effort: a connection whose queue is full or closing is skipped
    /// and logged; the failure never aborts delivery to the remaining
    /// targets and never reaches the caller.
    pub fn deliver_to_user(&self, user_id: &UserId, event: EventMessage) {
        let event = Arc::new(event);
        for (connection_id, sender) in self.registry().for_user(user_id) {
            self.dispatch(&connection_id, &sender, Arc::clone(&event));
        }
    }

    /// Fan an event out to every live connection system-wide.
    pub fn broadcast_all(&self, event: EventMessage) {
        let event = Arc::new(event);
        for (connection_id, sender) in self.registry().for_all() {
            self.dispatch(&connection_id, &sender, Arc::clone(&event));
        }
    }

    /// Deliver an event to a single connection. Used for synchronous error
    /// replies and the post-authentication initial-state push.
    pub fn deliver_to_connection(&self, connection_id: &ConnectionId, event: EventMessage) {
        if let Some(sender) = self.registry().sender_for(connection_id) {
            self.dispatch(connection_id, &sender, Arc::new(event));
        } else {
            tracing::debug!(%connection_id, "Dropping event for unknown connection");
        }
    }

    pub(crate) fn dispatch(
        &self,
        connection_id: &ConnectionId,
        sender: &mpsc::Sender<OutboundFrame>,
        event: Arc<EventMessage>,
    ) {
        match sender.try_send(OutboundFrame::Event(event)) {
            Ok(()) => self.metrics().increment_events_delivered(),
            Err(TrySendError::Full(_)) => {
                self.metrics().increment_events_dropped();
                tracing::warn!(%connection_id, "Send queue full; dropping event");
            }
            Err(TrySendError::Closed(_)) => {
                self.metrics().increment_events_dropped();
                tracing::debug!(%connection_id, "Send queue closed; dropping event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::HubConfig;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn test_hub() -> Arc<NotificationHub> {
        NotificationHub::new(HubConfig::default())
    }

    #[tokio::test]
    async fn deliver_to_user_reaches_only_that_user() {
        let hub = test_hub();
        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);
        hub.register_connection("u1".to_string(), tx_a);
        hub.register_connection("u2".to_string(), tx_b);

        hub.deliver_to_user(
            &"u1".to_string(),
            EventMessage::coach_message(json!({ "text": "keep it up" })),
        );

        let frame = rx_a.try_recv().expect("u1 receives the event");
        assert!(frame.as_event().is_some());
        assert!(rx_b.try_recv().is_err(), "u2 must receive nothing");
    }

    #[tokio::test]
    async fn broadcast_reaches_every_connection() {
        let hub = test_hub();
        let mut receivers = Vec::new();
        for i in 0..3 {
            let (tx, rx) = mpsc::channel(8);
            hub.register_connection(format!("user-{i}"), tx);
            receivers.push(rx);
        }

        hub.broadcast_all(EventMessage::sync_status(json!({ "state": "maintenance" })));

        for mut rx in receivers {
            assert!(rx.try_recv().is_ok(), "every connection receives broadcast");
        }
    }

    #[tokio::test]
    async fn empty_registry_delivery_is_a_silent_no_op() {
        let hub = test_hub();
        hub.deliver_to_user(&"u1".to_string(), EventMessage::health_data(json!({})));
        hub.broadcast_all(EventMessage::health_data(json!({})));
        assert_eq!(hub.metrics().snapshot().delivery.events_delivered, 0);
    }

    #[tokio::test]
    async fn full_queue_drops_without_aborting_the_fanout() {
        let hub = test_hub();
        let (tx_slow, _rx_slow) = mpsc::channel(1);
        let (tx_fast, mut rx_fast) = mpsc::channel(8);
        hub.register_connection("u1".to_string(), tx_slow);
        hub.register_connection("u1".to_string(), tx_fast);

        hub.deliver_to_user(&"u1".to_string(), EventMessage::health_data(json!({ "n": 1 })));
        hub.deliver_to_user(&"u1".to_string(), EventMessage::health_data(json!({ "n": 2 })));

        // The slow connection's queue held one event; the second was dropped
        // for it, but the fast connection still got both.
        assert!(rx_fast.try_recv().is_ok());
        assert!(rx_fast.try_recv().is_ok());
        assert_eq!(hub.metrics().snapshot().delivery.events_dropped, 1);
    }
}
