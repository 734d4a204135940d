use std::sync::Arc;

use crate::config::Config;
use crate::storage::{MemoryStorage, ResumeStorage};
use crate::store::{MemoryStore, Store};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Finished resume files (S3 in production, memory otherwise).
    pub storage: Arc<dyn ResumeStorage>,
    pub config: Config,
}

impl AppState {
    /// Fully in-process state: memory store, memory storage.
    pub fn in_memory(config: Config) -> Self {
        AppState {
            store: Arc::new(MemoryStore::new()),
            storage: Arc::new(MemoryStorage::new()),
            config,
        }
    }
}
