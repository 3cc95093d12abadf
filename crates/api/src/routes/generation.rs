//! Route definitions for per-component 3D generation tracking.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Routes mounted at `/creations`.
///
/// ```text
/// GET    /{creation_id}/generation                                  -> list_entries
/// DELETE /{creation_id}/generation                                  -> reset_creation
/// GET    /{creation_id}/components/{component_id}/generation        -> get_entry
/// POST   /{creation_id}/components/{component_id}/generation        -> apply_event
/// POST   /{creation_id}/components/{component_id}/generation/hydrate -> hydrate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{creation_id}/generation",
            get(generation::list_entries).delete(generation::reset_creation),
        )
        .route(
            "/{creation_id}/components/{component_id}/generation",
            get(generation::get_entry).post(generation::apply_event),
        )
        .route(
            "/{creation_id}/components/{component_id}/generation/hydrate",
            post(generation::hydrate),
        )
}
