use super::*;
use crate::alerts::AlertReason;
use queuewatch_backend::{EventKind, JobRecord, MemoryBackend, QueueCounts, QueueState};

fn config(queues: &[&str]) -> Config {
    let mut config = Config::default();
    config.monitor.queues = queues.iter().map(|q| q.to_string()).collect();
    config
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn test_subscribed_events_are_ingested() {
    let backend = Arc::new(MemoryBackend::new());
    let handle = Monitor::new(&config(&["email"]), backend.clone()).start().await;
    let facade = handle.facade();

    backend.enqueue("email", JobRecord::new("1", "send"));
    backend.start("email", JobRecord::new("1", "send"));

    wait_until(|| {
        facade
            .events(Some("email"), 10)
            .is_some_and(|events| events.len() == 2)
    })
    .await;

    handle.shutdown().await;
}

#[tokio::test]
async fn test_event_sender_feeds_ingestion() {
    let backend = Arc::new(MemoryBackend::new());
    let handle = Monitor::new(&config(&[]), backend).start().await;
    let facade = handle.facade();

    handle
        .event_sender()
        .send(LifecycleEvent::new("adhoc", EventKind::Error).with_error("redis gone"))
        .await
        .unwrap();

    wait_until(|| !facade.alerts(None).is_empty()).await;
    assert_eq!(facade.alerts(None)[0].reason, AlertReason::Error);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_periodic_tasks_refresh_and_evaluate() {
    let backend = Arc::new(MemoryBackend::new());
    backend.set_state(
        "email",
        QueueState {
            counts: QueueCounts {
                failed: 11,
                ..Default::default()
            },
            paused: false,
        },
    );

    let handle = Monitor::new(&config(&["email"]), backend).start().await;
    let facade = handle.facade();

    tokio::time::sleep(Duration::from_secs(11)).await;

    assert_eq!(facade.queue_status("email").unwrap().counts.failed, 11);
    assert!(
        facade
            .alerts(None)
            .iter()
            .any(|a| a.reason == AlertReason::HighFailureRate && a.queue == "email")
    );

    handle.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_stops_tasks() {
    let backend = Arc::new(MemoryBackend::new());
    let handle = Monitor::new(&config(&["email"]), backend).start().await;
    let token = handle.cancel_token();

    handle.shutdown().await;
    assert!(token.is_cancelled());
}
