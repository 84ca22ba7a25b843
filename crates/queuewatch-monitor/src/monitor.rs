//! Monitor assembly and background task supervision.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use queuewatch_backend::{EventSink, LifecycleEvent, QueueBackend};
use queuewatch_config::{Config, MonitorConfig};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::alert_engine::AlertEngine;
use crate::alert_manager::{AlertDispatcher, AlertManager};
use crate::facade::QueryFacade;
use crate::ingest::EventIngestor;
use crate::refresher::SnapshotRefresher;
use crate::registry::RecurringJobRegistry;
use crate::state::MonitorState;

const ALERT_NOTIFY_CAPACITY: usize = 64;

/// A configured monitor that has not started its background tasks yet.
pub struct Monitor {
    config: MonitorConfig,
    backend: Arc<dyn QueueBackend>,
    state: Arc<MonitorState>,
    engine: Arc<AlertEngine>,
    ingestor: Arc<EventIngestor>,
    refresher: Arc<SnapshotRefresher>,
    facade: Arc<QueryFacade>,
    dispatcher: AlertDispatcher,
    event_tx: EventSink,
    event_rx: mpsc::Receiver<LifecycleEvent>,
}

impl Monitor {
    /// Wire every component from configuration.
    pub fn new(config: &Config, backend: Arc<dyn QueueBackend>) -> Self {
        let monitor_config = config.monitor.clone();
        let state = Arc::new(MonitorState::new(&monitor_config));

        let (notifier, dispatcher) = AlertDispatcher::new(
            AlertManager::from_config(&config.alerts),
            ALERT_NOTIFY_CAPACITY,
        );
        let engine = Arc::new(
            AlertEngine::new(state.clone(), monitor_config.thresholds.clone())
                .with_notifier(notifier),
        );

        let ingestor = Arc::new(EventIngestor::new(state.clone(), engine.clone()));
        let refresher = Arc::new(
            SnapshotRefresher::new(state.clone(), backend.clone(), engine.clone())
                .with_timeout(Duration::from_millis(monitor_config.refresh_timeout_ms)),
        );
        let registry = Arc::new(
            RecurringJobRegistry::new(backend.clone(), config.recurring.queue.clone())
                .with_timeout(Duration::from_millis(config.backend.timeout_ms)),
        );
        let facade = Arc::new(
            QueryFacade::new(state.clone(), registry)
                .with_health_failed_count(monitor_config.thresholds.health_failed_count)
                .with_dashboard_alert_count(monitor_config.dashboard_alert_count),
        );

        let (event_tx, event_rx) = mpsc::channel(monitor_config.event_channel_capacity.max(1));

        Self {
            config: monitor_config,
            backend,
            state,
            engine,
            ingestor,
            refresher,
            facade,
            dispatcher,
            event_tx,
            event_rx,
        }
    }

    pub fn facade(&self) -> Arc<QueryFacade> {
        self.facade.clone()
    }

    pub fn state(&self) -> Arc<MonitorState> {
        self.state.clone()
    }

    /// Sender feeding the ingestion loop.
    pub fn event_sender(&self) -> EventSink {
        self.event_tx.clone()
    }

    /// Subscribe to configured queues and spawn the background tasks.
    pub async fn start(self) -> MonitorHandle {
        for queue in &self.config.queues {
            match self.backend.subscribe(queue, self.event_tx.clone()).await {
                Ok(()) => debug!("Subscribed to queue {}", queue),
                Err(e) => warn!("Could not subscribe to queue {}: {}", queue, e),
            }
        }

        let cancel = CancellationToken::new();
        let mut tasks = Vec::new();

        let ingestor = self.ingestor.clone();
        let token = cancel.clone();
        let rx = self.event_rx;
        tasks.push((
            "ingest",
            tokio::spawn(async move { ingestor.run(rx, token).await }),
        ));

        let dispatcher = self.dispatcher;
        let token = cancel.clone();
        tasks.push(("dispatch", tokio::spawn(dispatcher.run(token))));

        let refresher = self.refresher.clone();
        tasks.push((
            "refresh",
            spawn_periodic(
                "Snapshot refresh",
                Duration::from_secs(self.config.refresh_interval_secs),
                cancel.clone(),
                move || {
                    let refresher = refresher.clone();
                    async move {
                        let report = refresher.refresh_all().await;
                        if !report.failed.is_empty() {
                            warn!("Snapshot refresh failed for {:?}", report.failed);
                        }
                    }
                },
            ),
        ));

        let state = self.state.clone();
        tasks.push((
            "rollup",
            spawn_periodic(
                "Performance rollup",
                Duration::from_secs(self.config.rollup_interval_secs),
                cancel.clone(),
                move || {
                    let state = state.clone();
                    async move {
                        let system = state.performance.rollup();
                        debug!(
                            "Performance rollup: {} jobs, {:.1}ms average",
                            system.total_jobs, system.avg_processing_time_ms
                        );
                    }
                },
            ),
        ));

        let engine = self.engine.clone();
        tasks.push((
            "alerts",
            spawn_periodic(
                "Alert evaluation",
                Duration::from_secs(self.config.alert_interval_secs),
                cancel.clone(),
                move || {
                    let engine = engine.clone();
                    async move {
                        let raised = engine.evaluate();
                        if !raised.is_empty() {
                            debug!("Alert evaluation raised {} alerts", raised.len());
                        }
                    }
                },
            ),
        ));

        info!(
            "Monitor started with backend {} ({} configured queues)",
            self.backend.name(),
            self.config.queues.len()
        );

        MonitorHandle {
            cancel,
            tasks,
            facade: self.facade,
            event_tx: self.event_tx,
        }
    }
}

/// Run `tick` every `period` until `cancel` fires.
///
/// A tick in flight when cancellation arrives runs to completion.
fn spawn_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    cancel: CancellationToken,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        info!("{} started (interval: {:?})", name, period);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    tick().await;
                }
                _ = cancel.cancelled() => {
                    info!("{} shutting down", name);
                    break;
                }
            }
        }
    })
}

/// Handle to a running monitor.
pub struct MonitorHandle {
    cancel: CancellationToken,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
    facade: Arc<QueryFacade>,
    event_tx: EventSink,
}

impl MonitorHandle {
    pub fn facade(&self) -> Arc<QueryFacade> {
        self.facade.clone()
    }

    /// Sender feeding the ingestion loop.
    pub fn event_sender(&self) -> EventSink {
        self.event_tx.clone()
    }

    /// Token cancelled on shutdown.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop every background task and wait for them to finish.
    pub async fn shutdown(self) {
        info!("Stopping monitor");
        self.cancel.cancel();

        for (name, task) in self.tasks {
            if let Err(e) = task.await {
                error!("Monitor task {} ended abnormally: {}", name, e);
            }
        }
        info!("Monitor stopped");
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
