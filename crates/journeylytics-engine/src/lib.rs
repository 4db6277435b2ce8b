pub mod analytics_impl;
pub mod backend;
pub mod loader;
pub mod queries;

pub use backend::MemoryBackend;
pub use loader::{load_events, read_events, LoadError};
