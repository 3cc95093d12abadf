//! Handlers for per-component 3D generation tracking.
//!
//! The web client reports what it observes (job dispatched, CAD source
//! received, local compile started, preview rendered, failure) and reads the
//! resulting entry back. Entries live in the process-local
//! [`GenerationTracker`](forgekit_core::tracker::GenerationTracker).

use axum::extract::{Path, State};
use axum::Json;
use forgekit_core::error::CoreError;
use forgekit_core::tracker::{
    ArtifactOrigin, Diagnostics, GenerationEntry, RemoteSnapshot, ScadUpdate,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// A tracker transition, tagged by `event`.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GenerationEvent {
    AwaitingJob,
    ScadAvailable(ScadUpdate),
    Compiling,
    #[serde(rename_all = "camelCase")]
    PreviewReady {
        preview_artifact: String,
        #[serde(default)]
        origin: ArtifactOrigin,
        diagnostics: Option<Diagnostics>,
    },
    Error {
        message: String,
    },
}

/// One tracked component of a creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentEntry {
    pub component_id: String,
    #[serde(flatten)]
    pub entry: GenerationEntry,
}

#[derive(Debug, Serialize)]
pub struct ResetResult {
    pub removed: usize,
}

/// GET /api/creations/{creation_id}/generation
pub async fn list_entries(
    State(state): State<AppState>,
    Path(creation_id): Path<String>,
) -> Json<DataResponse<Vec<ComponentEntry>>> {
    let tracker = state.tracker.lock().await;
    let data = tracker
        .entries_for_creation(&creation_id)
        .into_iter()
        .map(|(component_id, entry)| ComponentEntry {
            component_id: component_id.to_string(),
            entry: entry.clone(),
        })
        .collect();
    Json(DataResponse { data })
}

/// DELETE /api/creations/{creation_id}/generation
///
/// Forget every component of the creation, including computed previews.
pub async fn reset_creation(
    State(state): State<AppState>,
    Path(creation_id): Path<String>,
) -> Json<DataResponse<ResetResult>> {
    let removed = state.tracker.lock().await.reset_for_creation(&creation_id);
    Json(DataResponse {
        data: ResetResult { removed },
    })
}

/// GET /api/creations/{creation_id}/components/{component_id}/generation
pub async fn get_entry(
    State(state): State<AppState>,
    Path((creation_id, component_id)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<GenerationEntry>>> {
    let tracker = state.tracker.lock().await;
    let entry = tracker
        .get_entry(&creation_id, &component_id)
        .cloned()
        .ok_or_else(|| {
            CoreError::not_found("GenerationEntry", format!("{creation_id}:{component_id}"))
        })?;
    Ok(Json(DataResponse { data: entry }))
}

/// POST /api/creations/{creation_id}/components/{component_id}/generation
pub async fn apply_event(
    State(state): State<AppState>,
    Path((creation_id, component_id)): Path<(String, String)>,
    Json(event): Json<GenerationEvent>,
) -> Json<DataResponse<GenerationEntry>> {
    let mut tracker = state.tracker.lock().await;
    let (c, k) = (creation_id.as_str(), component_id.as_str());
    let entry = match event {
        GenerationEvent::AwaitingJob => tracker.mark_awaiting_job(c, k),
        GenerationEvent::ScadAvailable(update) => tracker.mark_scad_available(c, k, update),
        GenerationEvent::Compiling => tracker.mark_compiling(c, k),
        GenerationEvent::PreviewReady {
            preview_artifact,
            origin,
            diagnostics,
        } => tracker.mark_preview_ready(c, k, preview_artifact, origin, diagnostics),
        GenerationEvent::Error { message } => tracker.mark_error(c, k, message),
    };
    Json(DataResponse {
        data: entry.clone(),
    })
}

/// POST /api/creations/{creation_id}/components/{component_id}/generation/hydrate
///
/// Reconcile with a snapshot polled from a remote job or stored record.
pub async fn hydrate(
    State(state): State<AppState>,
    Path((creation_id, component_id)): Path<(String, String)>,
    Json(snapshot): Json<RemoteSnapshot>,
) -> Json<DataResponse<GenerationEntry>> {
    let mut tracker = state.tracker.lock().await;
    let entry = tracker.hydrate_from_model(&creation_id, &component_id, snapshot);
    Json(DataResponse {
        data: entry.clone(),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn scad_event_carries_update_fields() {
        let event: GenerationEvent = serde_json::from_value(json!({
            "event": "scadAvailable",
            "sourceCode": "cube(10);",
            "previewArtifact": "https://cdn/mesh.stl"
        }))
        .unwrap();
        assert_matches!(
            event,
            GenerationEvent::ScadAvailable(ScadUpdate { source_code: Some(ref s), .. }) if s == "cube(10);"
        );
    }

    #[test]
    fn preview_origin_defaults_to_server() {
        let event: GenerationEvent = serde_json::from_value(json!({
            "event": "previewReady",
            "previewArtifact": "mesh"
        }))
        .unwrap();
        assert_matches!(
            event,
            GenerationEvent::PreviewReady { origin: ArtifactOrigin::Server, .. }
        );
    }

    #[test]
    fn unknown_event_is_rejected() {
        let result = serde_json::from_value::<GenerationEvent>(json!({ "event": "exploded" }));
        assert!(result.is_err());
    }
}
