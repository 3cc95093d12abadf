//! Shared response envelope types for API handlers.
//!
//! Resource endpoints (jobs, generation tracking) answer with a
//! `{ "data": ... }` envelope. The `/api/hardware` endpoints keep the
//! response shapes their web client reads and do not use it.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: job }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
