use std::sync::Arc;

use forgekit_core::tracker::GenerationTracker;
use forgekit_llm::LanguageModel;
use forgekit_pipeline::ReportSynchronizer;
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: forgekit_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Model call, validation and report persistence.
    pub synchronizer: ReportSynchronizer,
    /// Per-component 3D generation lifecycle, process-local.
    pub tracker: Arc<Mutex<GenerationTracker>>,
}

impl AppState {
    pub fn new(
        pool: forgekit_db::DbPool,
        config: ServerConfig,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            synchronizer: ReportSynchronizer::new(pool.clone(), model),
            pool,
            config: Arc::new(config),
            tracker: Arc::new(Mutex::new(GenerationTracker::new())),
        }
    }
}
