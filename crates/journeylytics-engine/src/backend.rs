use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use journeylytics_core::event::EventTable;

use crate::loader::{load_events, LoadError};

/// In-memory analytics backend over a single event table.
///
/// The table is immutable once loaded. Readers clone the inner `Arc` and
/// compute without holding the lock, so a reload only blocks for the pointer
/// swap and never waits on a running aggregation.
pub struct MemoryBackend {
    table: RwLock<Arc<EventTable>>,
}

impl MemoryBackend {
    pub fn new(table: EventTable) -> Self {
        Self {
            table: RwLock::new(Arc::new(table)),
        }
    }

    /// Load a CSV event log from `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let table = load_events(path)?;
        info!(path = %path.display(), events = table.len(), "Event table loaded");
        Ok(Self::new(table))
    }

    /// Current table. Later reloads do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<EventTable> {
        Arc::clone(&self.table.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swap in a new table for subsequent reads.
    pub fn replace(&self, table: EventTable) {
        let events = table.len();
        *self.table.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(table);
        info!(events, "Event table replaced");
    }

    /// Re-read `path` and swap it in. The current table stays in place if
    /// loading fails.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<usize, LoadError> {
        let table = load_events(path)?;
        let events = table.len();
        self.replace(table);
        Ok(events)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(EventTable::default())
    }
}
