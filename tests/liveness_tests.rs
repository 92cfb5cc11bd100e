
use pulse_hub::hub::{HubConfig, OutboundFrame};
use std::time::Duration;
use test_helpers::{create_test_hub_with_config, TEST_SECRET};
use tokio::sync::mpsc;

fn fast_heartbeat_config() -> HubConfig {
    HubConfig {
        heartbeat_interval: Duration::from_millis(50),
        jwt_secret: Some(TEST_SECRET.to_string()),
        ..HubConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn silent_connection_is_evicted_after_the_grace_interval() {
    let hub = create_test_hub_with_config(fast_heartbeat_config());
    hub.start();

    let (tx, mut rx) = mpsc::channel(8);
    hub.register_connection("u1".to_string(), tx);

    // First sweep probes; the connection never acknowledges, so the second
    // sweep evicts it and releases its transport handle.
    let mut saw_probe = false;
    loop {
        match tokio::time::timeout(Duration::from_secs(2), rx.recv()).await {
            Ok(Some(OutboundFrame::Ping)) => saw_probe = true,
            Ok(Some(OutboundFrame::Event(_))) => {}
            Ok(None) => break, // queue closed by eviction
            Err(_) => panic!("liveness monitor made no progress"),
        }
    }

    assert!(saw_probe, "a probe precedes eviction");
    assert_eq!(hub.connection_count(), 0);
    assert_eq!(hub.metrics().snapshot().liveness.evictions, 1);

    hub.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn acknowledged_connection_survives_many_sweeps() {
    let hub = create_test_hub_with_config(fast_heartbeat_config());
    hub.start();

    let (tx, mut rx) = mpsc::channel(8);
    let id = hub.register_connection("u1".to_string(), tx);

    // Acknowledge every probe for ~6 intervals.
    let acks = {
        let hub = hub.clone();
        tokio::spawn(async move {
            let deadline = tokio::time::Instant::now() + Duration::from_millis(300);
            while tokio::time::Instant::now() < deadline {
                if let Ok(Some(OutboundFrame::Ping)) =
                    tokio::time::timeout(Duration::from_millis(100), rx.recv()).await
                {
                    hub.record_ack(&id);
                }
            }
        })
    };
    acks.await.expect("ack task completes");

    assert_eq!(hub.connection_count(), 1, "acknowledged connection stays");
    assert_eq!(hub.metrics().snapshot().liveness.evictions, 0);

    hub.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn shutdown_stops_the_monitor_and_drains_the_registry() {
    let hub = create_test_hub_with_config(fast_heartbeat_config());
    hub.start();

    let (tx, mut rx) = mpsc::channel(8);
    hub.register_connection("u1".to_string(), tx);

    hub.shutdown().await;

    assert_eq!(hub.connection_count(), 0);
    // The registry held the only sender; shutdown closed the queue.
    while rx.recv().await.is_some() {}
}
