//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::collector::SummaryCollector;

/// Default message for the liveness route.
pub const DEFAULT_SERVICE_MESSAGE: &str = "Summarizer API is running";

/// Shared, read-only application state.
pub struct AppState {
    /// Collector backing every summarize route.
    pub collector: SummaryCollector,
    /// Message reported by `GET /`.
    pub service_message: String,
}

impl AppState {
    pub fn new(collector: SummaryCollector) -> Arc<Self> {
        Self::with_service_message(collector, DEFAULT_SERVICE_MESSAGE)
    }

    pub fn with_service_message(
        collector: SummaryCollector,
        message: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            collector,
            service_message: message.into(),
        })
    }
}
