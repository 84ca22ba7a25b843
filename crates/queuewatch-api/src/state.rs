//! Application state.

use std::sync::Arc;

use queuewatch_backend::EventSink;
use queuewatch_monitor::QueryFacade;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<QueryFacade>,
    /// Feeds events pushed over HTTP into the ingestion loop.
    pub events: EventSink,
}

impl AppState {
    pub fn new(facade: Arc<QueryFacade>, events: EventSink) -> Self {
        Self { facade, events }
    }
}
