//! Recurring job registry.
//!
//! Declares, enumerates and removes cron-scheduled repeatable jobs on a single
//! backend queue. No state is kept locally: every lookup asks the backend.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use queuewatch_backend::{BackendError, QueueBackend, RepeatOptions, RepeatableJob};
use tracing::{info, warn};

use crate::error::MonitorError;

/// A registered recurring job.
pub type RecurringJob = RepeatableJob;

/// Registry bound to one backend queue.
pub struct RecurringJobRegistry {
    backend: Arc<dyn QueueBackend>,
    queue: String,
    timeout: Duration,
}

impl RecurringJobRegistry {
    pub fn new(backend: Arc<dyn QueueBackend>, queue: impl Into<String>) -> Self {
        Self {
            backend,
            queue: queue.into(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Set the timeout applied to every backend call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Queue holding the definitions.
    pub fn queue(&self) -> &str {
        &self.queue
    }

    async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<T, MonitorError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(MonitorError::from),
            Err(_) => Err(MonitorError::from(BackendError::Timeout(
                self.timeout.as_millis() as u64,
            ))),
        }
    }

    /// Register a recurring job. An existing job with the same name is replaced.
    pub async fn add(
        &self,
        name: &str,
        data: serde_json::Value,
        pattern: &str,
        options: RepeatOptions,
    ) -> Result<RecurringJob, MonitorError> {
        if name.trim().is_empty() {
            return Err(MonitorError::Validation("job name cannot be empty".to_string()));
        }
        if pattern.trim().is_empty() {
            return Err(MonitorError::Validation("cron pattern cannot be empty".to_string()));
        }

        let job = self
            .call(self.backend.add_repeatable(&self.queue, name, data, pattern, options))
            .await
            .inspect_err(|e| warn!("Failed to register recurring job {}: {}", name, e))?;

        info!(
            "Recurring job {} registered on {} ({}), next run {:?}",
            job.name, self.queue, job.pattern, job.next_run
        );
        Ok(job)
    }

    /// Remove a recurring job by name. Returns false when no job has that name.
    pub async fn remove(&self, name: &str) -> Result<bool, MonitorError> {
        let Some(job) = self.get(name).await? else {
            return Ok(false);
        };

        let removed = self
            .call(self.backend.remove_repeatable(&self.queue, &job.key))
            .await?;
        if removed {
            info!("Recurring job {} removed from {}", name, self.queue);
        }
        Ok(removed)
    }

    /// Every recurring job, fresh from the backend.
    pub async fn list(&self) -> Result<Vec<RecurringJob>, MonitorError> {
        self.call(self.backend.list_repeatable(&self.queue)).await
    }

    /// Look up a recurring job by exact name.
    pub async fn get(&self, name: &str) -> Result<Option<RecurringJob>, MonitorError> {
        Ok(self.list().await?.into_iter().find(|job| job.name == name))
    }

    /// Pause the recurring queue.
    pub async fn pause(&self) -> Result<(), MonitorError> {
        self.call(self.backend.pause(&self.queue)).await?;
        info!("Recurring queue {} paused", self.queue);
        Ok(())
    }

    /// Resume the recurring queue.
    pub async fn resume(&self) -> Result<(), MonitorError> {
        self.call(self.backend.resume(&self.queue)).await?;
        info!("Recurring queue {} resumed", self.queue);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use queuewatch_backend::MemoryBackend;

    fn registry() -> (Arc<MemoryBackend>, RecurringJobRegistry) {
        let backend = Arc::new(MemoryBackend::new());
        let registry = RecurringJobRegistry::new(backend.clone(), "recurring");
        (backend, registry)
    }

    #[tokio::test]
    async fn test_add_list_remove() {
        let (_backend, registry) = registry();
        let job = registry
            .add("nightly", serde_json::json!({"report": "daily"}), "0 2 * * *", RepeatOptions::default())
            .await
            .unwrap();
        assert_eq!(job.name, "nightly");
        assert!(job.next_run.is_some());

        let jobs = registry.list().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].data["report"], "daily");

        assert!(registry.remove("nightly").await.unwrap());
        assert!(!registry.remove("nightly").await.unwrap());
        assert!(registry.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_matches_exact_name() {
        let (_backend, registry) = registry();
        registry
            .add("nightly-report", serde_json::json!({}), "0 2 * * *", RepeatOptions::default())
            .await
            .unwrap();

        assert!(!registry.remove("nightly").await.unwrap());
        assert!(registry.get("nightly-report").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_add_validation() {
        let (_backend, registry) = registry();
        let err = registry
            .add("", serde_json::json!({}), "0 2 * * *", RepeatOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::Validation(_)));

        let err = registry
            .add("nightly", serde_json::json!({}), "  ", RepeatOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_invalid_schedule() {
        let (_backend, registry) = registry();
        let err = registry
            .add("broken", serde_json::json!({}), "whenever", RepeatOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::InvalidSchedule(_)));
    }

    #[tokio::test]
    async fn test_add_unsupported_timezone() {
        let (backend, registry) = registry();
        let options = RepeatOptions {
            tz: Some("America/New_York".to_string()),
            limit: Some(5),
            ..Default::default()
        };
        let err = registry
            .add("nightly", serde_json::json!({}), "0 2 * * *", options)
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::InvalidSchedule(_)));
        assert!(backend.list_repeatable("recurring").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backend_unavailable() {
        let (backend, registry) = registry();
        backend.set_unavailable(true);

        let err = registry
            .add("nightly", serde_json::json!({}), "0 2 * * *", RepeatOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::BackendUnavailable(_)));
        assert!(matches!(
            registry.list().await,
            Err(MonitorError::BackendUnavailable(_))
        ));
        assert!(matches!(
            registry.remove("nightly").await,
            Err(MonitorError::BackendUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_pause_resume() {
        let (backend, registry) = registry();
        registry.pause().await.unwrap();
        assert!(backend.queue_state("recurring").await.unwrap().paused);
        registry.resume().await.unwrap();
        assert!(!backend.queue_state("recurring").await.unwrap().paused);
    }
}
