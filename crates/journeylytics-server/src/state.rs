use std::sync::Arc;

use journeylytics_core::analytics::AnalyticsBackend;
use journeylytics_core::config::Config;
use journeylytics_engine::{LoadError, MemoryBackend};

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// The in-memory backend. Concrete type so reload can swap its table.
    pub backend: Arc<MemoryBackend>,

    /// Read-only view of `backend` used by the query handlers.
    pub analytics: Arc<dyn AnalyticsBackend>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(backend: MemoryBackend, config: Config) -> Self {
        let backend = Arc::new(backend);
        Self {
            analytics: Arc::clone(&backend) as Arc<dyn AnalyticsBackend>,
            backend,
            config: Arc::new(config),
        }
    }

    /// Re-read the configured CSV and swap it in. Returns the new event count.
    pub fn reload(&self) -> Result<usize, LoadError> {
        self.backend.reload(&self.config.data_path)
    }
}
