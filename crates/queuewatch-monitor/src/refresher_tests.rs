use super::*;
use crate::alerts::AlertSeverity;
use async_trait::async_trait;
use queuewatch_backend::{
    EventSink, MemoryBackend, QueueCounts, QueueState, RepeatOptions, RepeatableJob,
};
use queuewatch_config::{MonitorConfig, ThresholdsConfig};

fn setup(
    queues: &[&str],
    backend: Arc<dyn QueueBackend>,
) -> (Arc<MonitorState>, SnapshotRefresher) {
    let config = MonitorConfig {
        queues: queues.iter().map(|q| q.to_string()).collect(),
        ..Default::default()
    };
    let state = Arc::new(MonitorState::new(&config));
    let engine = Arc::new(AlertEngine::new(state.clone(), ThresholdsConfig::default()));
    let refresher = SnapshotRefresher::new(state.clone(), backend, engine);
    (state, refresher)
}

fn counts(waiting: u64, failed: u64) -> QueueState {
    QueueState {
        counts: QueueCounts {
            waiting,
            failed,
            ..Default::default()
        },
        paused: false,
    }
}

/// Backend whose state query never answers.
struct HangingBackend;

#[async_trait]
impl QueueBackend for HangingBackend {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn queue_state(&self, _queue: &str) -> Result<QueueState, BackendError> {
        futures::future::pending().await
    }

    async fn subscribe(&self, _queue: &str, _sink: EventSink) -> Result<(), BackendError> {
        Ok(())
    }

    async fn add_repeatable(
        &self,
        _queue: &str,
        _name: &str,
        _data: serde_json::Value,
        _pattern: &str,
        _options: RepeatOptions,
    ) -> Result<RepeatableJob, BackendError> {
        Err(BackendError::Unavailable("hanging".to_string()))
    }

    async fn list_repeatable(&self, _queue: &str) -> Result<Vec<RepeatableJob>, BackendError> {
        Ok(Vec::new())
    }

    async fn remove_repeatable(&self, _queue: &str, _key: &str) -> Result<bool, BackendError> {
        Ok(false)
    }

    async fn pause(&self, _queue: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn resume(&self, _queue: &str) -> Result<(), BackendError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_refresh_overwrites_counts() {
    let backend = Arc::new(MemoryBackend::new());
    backend.set_state("email", counts(4, 2));
    let (state, refresher) = setup(&["email"], backend);

    refresher.refresh("email").await.unwrap();

    let snapshot = state.snapshots.get("email").unwrap();
    assert_eq!(snapshot.counts.waiting, 4);
    assert_eq!(snapshot.counts.failed, 2);
}

#[tokio::test]
async fn test_refresh_failure_keeps_snapshot_and_alerts() {
    let backend = Arc::new(MemoryBackend::new());
    backend.set_state("email", counts(4, 0));
    let (state, refresher) = setup(&["email"], backend.clone());
    refresher.refresh("email").await.unwrap();

    backend.set_unavailable(true);
    let err = refresher.refresh("email").await.unwrap_err();
    assert!(matches!(err, MonitorError::BackendUnavailable(_)));

    assert_eq!(state.snapshots.get("email").unwrap().counts.waiting, 4);
    let alerts = state.alerts.list(Some(AlertSeverity::Critical));
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].reason, AlertReason::Error);
    assert_eq!(state.counters.refresh_failures(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_times_out() {
    let (state, refresher) = setup(&["email"], Arc::new(HangingBackend));
    let refresher = refresher.with_timeout(Duration::from_millis(200));

    let err = refresher.refresh("email").await.unwrap_err();
    match err {
        MonitorError::BackendUnavailable(msg) => assert!(msg.contains("200ms")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(state.alerts.len(), 1);
}

#[tokio::test]
async fn test_refresh_all_covers_configured_and_seen_queues() {
    let backend = Arc::new(MemoryBackend::new());
    backend.set_state("email", counts(1, 0));
    backend.set_state("reports", counts(2, 0));
    let (state, refresher) = setup(&["email"], backend);
    state.snapshots.ensure("reports");

    let report = refresher.refresh_all().await;
    assert_eq!(report.refreshed, vec!["email", "reports"]);
    assert!(report.failed.is_empty());
    assert_eq!(state.snapshots.get("reports").unwrap().counts.waiting, 2);
}

#[tokio::test]
async fn test_refresh_all_isolates_failures() {
    let backend = Arc::new(MemoryBackend::new());
    backend.set_unavailable(true);
    let (state, refresher) = setup(&["email", "reports"], backend);

    let report = refresher.refresh_all().await;
    assert!(report.refreshed.is_empty());
    assert_eq!(report.failed, vec!["email", "reports"]);
    assert_eq!(state.alerts.len(), 2);
}
