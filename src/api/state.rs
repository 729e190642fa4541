use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::services::RecommenderEngine;

/// Shared application state
///
/// The engine sits behind a single lock: profile and interaction writes are
/// serialized, while read-only lookups may run concurrently.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<RecommenderEngine>>,
    pub snapshot_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(engine: RecommenderEngine, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
            snapshot_path: Arc::new(snapshot_path.into()),
        }
    }
}
