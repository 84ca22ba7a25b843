//! Server initialization and startup logic for queuewatch.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use queuewatch_api::{ApiConfig, ApiServer, AppState};
use queuewatch_backend::{BackendError, HttpBackend, MemoryBackend, QueueBackend};
use queuewatch_config::{
    BackendConfig, BackendKind, Config, ConfigError, ConfigLoader, ConfigValidator, LoggingConfig,
};
use queuewatch_monitor::Monitor;

/// Initialize tracing with console and file output.
///
/// Log files are written to the configured directory with daily rotation.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = PathBuf::from(ConfigLoader::expand_path(&logging.dir));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("queuewatch")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keeps the background writer alive for the whole process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Build the queue backend selected in configuration.
pub(crate) fn build_backend(config: &BackendConfig) -> Result<Arc<dyn QueueBackend>, BackendError> {
    match config.kind {
        BackendKind::Memory => Ok(Arc::new(MemoryBackend::new())),
        BackendKind::Http => {
            let base_url = config.base_url.as_deref().ok_or_else(|| {
                BackendError::Protocol("http backend requires backend.base_url".to_string())
            })?;
            Ok(Arc::new(HttpBackend::new(base_url, config.timeout_ms)?))
        }
    }
}

/// Run the monitor and HTTP API until ctrl-c.
pub(crate) async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting queuewatch v{}", env!("CARGO_PKG_VERSION"));

    let validation = ConfigValidator::validate(&config)?;
    for warning in &validation.warnings {
        warn!("Config warning at {}: {}", warning.path, warning.message);
    }
    if let Some(e) = ConfigError::from_validation(&validation) {
        return Err(e.into());
    }

    let backend = build_backend(&config.backend)?;
    info!("Using {} backend", backend.name());

    let handle = Monitor::new(&config, backend).start().await;

    let server = ApiServer::new(
        ApiConfig::new(config.server.host.clone(), config.server.port),
        AppState::new(handle.facade(), handle.event_sender()),
    );
    let served = server.run(shutdown_signal()).await;

    handle.shutdown().await;
    served?;

    info!("queuewatch stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
    }
}
