use axum::extract::State;
use axum::{routing::get, Json, Router};
use forgekit_db::repositories::JobRepo;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Jobs waiting for the worker; absent when the database is down.
    pub pending_jobs: Option<i64>,
    /// (creation, component) pairs held by the generation tracker.
    pub tracked_generations: usize,
}

/// GET /health -- database reachability, job backlog and tracker size.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let pending_jobs = match JobRepo::count_pending(&state.pool).await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            None
        }
    };
    let db_healthy = pending_jobs.is_some();
    let tracked_generations = state.tracker.lock().await.len();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        pending_jobs,
        tracked_generations,
    })
}

/// Mount health check routes (root level, not under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
