//! Route definitions for the `/hardware` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::hardware;
use crate::state::AppState;

/// Routes mounted at `/hardware`.
///
/// ```text
/// POST   /generate-3d         -> generate_components
/// POST   /generate-assembly   -> generate_assembly
/// POST   /generate-firmware   -> generate_firmware
/// POST   /chat                -> chat
/// GET    /reports             -> get_reports
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-3d", post(hardware::generate_components))
        .route("/generate-assembly", post(hardware::generate_assembly))
        .route("/generate-firmware", post(hardware::generate_firmware))
        .route("/chat", post(hardware::chat))
        .route("/reports", get(hardware::get_reports))
}
