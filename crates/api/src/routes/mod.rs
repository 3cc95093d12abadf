pub mod generation;
pub mod hardware;
pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /hardware/generate-3d                                   POST
/// /hardware/generate-assembly                             POST
/// /hardware/generate-firmware                             POST
/// /hardware/chat                                          POST
/// /hardware/reports                                       GET
///
/// /jobs                                                   POST
/// /jobs/{id}                                              GET
///
/// /creations/{creation_id}/generation                     GET, DELETE
/// /creations/{creation_id}/components/{component_id}/generation
///                                                         GET, POST
/// /creations/{creation_id}/components/{component_id}/generation/hydrate
///                                                         POST
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/hardware", hardware::router())
        .nest("/jobs", jobs::router())
        .nest("/creations", generation::router())
}
