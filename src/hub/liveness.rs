use tokio::time::MissedTickBehavior;

use super::{NotificationHub, OutboundFrame};

impl NotificationHub {
    /// Periodic liveness sweep, cancelled by the hub's shutdown token.
    ///
    /// Each visited connection either gets a probe (Alive -> AwaitingAck) or,
    /// if the previous probe's acknowledgment never arrived, is evicted.
    /// This one-interval grace period distinguishes a slow link from a dead
    /// one. The sweep tolerates arrivals and departures happening while it
    /// runs; at worst a departing connection costs one failed probe send.
    pub(crate) async fn liveness_task(&self) {
        let mut ticker = tokio::time::interval(self.config().heartbeat_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick of a tokio interval completes immediately; consume
        // it so the first sweep lands one full interval after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                () = self.shutdown_token.cancelled() => break,
                _ = ticker.tick() => self.sweep_connections(),
            }
        }

        tracing::debug!("Liveness monitor stopped");
    }

    /// One pass of the liveness state machine over every registered
    /// connection.
    pub(crate) fn sweep_connections(&self) {
        let outcome = self.registry().collect_liveness_transitions();

        for connection_id in &outcome.evicted {
            let idle_secs = self
                .registry()
                .idle_for(connection_id)
                .map(|idle| idle.as_secs())
                .unwrap_or_default();
            // Eviction is normal churn for mobile clients, not an error.
            tracing::info!(
                %connection_id,
                idle_secs,
                "Evicting connection after missed heartbeat acknowledgment"
            );
            self.metrics().increment_liveness_evictions();
            self.unregister_connection(connection_id);
        }

        for (connection_id, sender) in outcome.probes {
            self.metrics().increment_liveness_probes();
            if sender.try_send(OutboundFrame::Ping).is_err() {
                tracing::debug!(%connection_id, "Liveness probe not sent; connection is tearing down");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::HubConfig;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn first_sweep_probes_second_sweep_evicts() {
        let hub = NotificationHub::new(HubConfig::default());
        let (tx, mut rx) = mpsc::channel(8);
        hub.register_connection("u1".to_string(), tx);

        hub.sweep_connections();
        assert!(
            matches!(rx.try_recv(), Ok(OutboundFrame::Ping)),
            "first sweep sends a probe"
        );
        assert_eq!(hub.connection_count(), 1);

        hub.sweep_connections();
        assert_eq!(hub.connection_count(), 0, "silent connection is evicted");
        assert!(rx.recv().await.is_none(), "transport handle is released");
        assert_eq!(hub.metrics().snapshot().liveness.evictions, 1);
    }

    #[tokio::test]
    async fn acknowledgment_between_sweeps_prevents_eviction() {
        let hub = NotificationHub::new(HubConfig::default());
        let (tx, mut rx) = mpsc::channel(8);
        let id = hub.register_connection("u1".to_string(), tx);

        for _ in 0..4 {
            hub.sweep_connections();
            assert!(matches!(rx.try_recv(), Ok(OutboundFrame::Ping)));
            hub.record_ack(&id);
        }

        assert_eq!(hub.connection_count(), 1);
        assert_eq!(hub.metrics().snapshot().liveness.evictions, 0);
    }

    #[tokio::test]
    async fn sweep_tolerates_concurrent_departures() {
        let hub = NotificationHub::new(HubConfig::default());
        let (tx, rx) = mpsc::channel(8);
        let id = hub.register_connection("u1".to_string(), tx);

        // The receiver is gone before the probe; the sweep must not fail.
        drop(rx);
        hub.sweep_connections();
        hub.unregister_connection(&id);
        hub.sweep_connections();

        assert_eq!(hub.connection_count(), 0);
    }
}
