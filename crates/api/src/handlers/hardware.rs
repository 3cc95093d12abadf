//! Handlers for the `/hardware` resource: section generation, chat edits
//! and report retrieval.
//!
//! Callers identify themselves with an optional `userId`, trusted as-is.
//! A project registered with an owner is only readable and writable by
//! that owner when a `userId` is supplied.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::Json;
use forgekit_core::error::CoreError;
use forgekit_core::report::{normalize_stored_section, ReportKind};
use forgekit_core::types::ReportId;
use forgekit_db::models::chat_message::{CreateChatMessage, ROLE_USER};
use forgekit_db::models::project::EnsureProject;
use forgekit_db::repositories::{ChatMessageRepo, ProjectRepo, ReportRepo};
use forgekit_pipeline::{EditRequest, GenerateRequest};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::access::{authorize, charge_generation, claim_project};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    #[validate(length(min = 1, message = "projectData.id is required"))]
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Body of the three `generate-*` endpoints.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    #[validate(nested)]
    pub project_data: ProjectData,
    pub report_id: Option<ReportId>,
    pub user_id: Option<String>,
    /// Target board for firmware generation.
    pub microcontroller: Option<String>,
    pub options: Option<Value>,
}

impl GenerateBody {
    fn into_request(self) -> AppResult<GenerateRequest> {
        let description = self
            .project_data
            .description
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("projectData.description is required".into()))?;

        let mut params = Map::new();
        if let Some(mcu) = self.microcontroller {
            params.insert("microcontroller".into(), Value::String(mcu));
        }
        if let Some(options) = self.options.filter(|o| !o.is_null()) {
            params.insert("options".into(), options);
        }

        Ok(GenerateRequest {
            project_id: self.project_data.id,
            report_id: self.report_id,
            user_id: self.user_id,
            title: self.project_data.title,
            prompt_context: description,
            section_params: (!params.is_empty()).then_some(Value::Object(params)),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub report_id: ReportId,
    pub data: Value,
    pub summary: String,
}

/// What a chat message edits.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTarget {
    /// A section name, or `component` for a single 3D component.
    #[serde(rename = "type")]
    pub kind: String,
    pub component_id: Option<usize>,
    pub report_id: Option<ReportId>,
    pub component_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    #[validate(length(min = 1, message = "projectId is required"))]
    pub project_id: String,
    /// Present when the edited component is tracked for 3D generation.
    pub creation_id: Option<String>,
    pub user_id: Option<String>,
    #[validate(length(min = 1, message = "message must not be empty"))]
    pub message: String,
    pub target: ChatTarget,
    pub context: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    #[serde(rename = "AI response")]
    pub ai_response: String,
    #[serde(rename = "AI content")]
    pub ai_content: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsQuery {
    pub project_id: String,
    pub user_id: Option<String>,
    pub report_id: Option<ReportId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsResponse {
    pub success: bool,
    pub reports: BTreeMap<&'static str, Value>,
    pub title: String,
    pub count: usize,
    pub report_id: Option<ReportId>,
}

// ---------------------------------------------------------------------------
// Generate
// ---------------------------------------------------------------------------

async fn generate(
    state: AppState,
    kind: ReportKind,
    body: GenerateBody,
) -> AppResult<Json<GenerateResponse>> {
    body.validate()?;
    let req = body.into_request()?;

    claim_project(
        &state,
        EnsureProject {
            id: req.project_id.clone(),
            user_id: req.user_id.clone(),
            title: req.title.clone(),
            description: Some(req.prompt_context.clone()),
        },
    )
    .await?;
    charge_generation(&state, req.user_id.as_deref()).await?;

    let outcome = state.synchronizer.generate(kind, &req).await?;

    Ok(Json(GenerateResponse {
        report_id: outcome.report_id,
        data: outcome.payload,
        summary: outcome.summary,
    }))
}

/// POST /api/hardware/generate-3d
pub async fn generate_components(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> AppResult<Json<GenerateResponse>> {
    generate(state, ReportKind::Components, body).await
}

/// POST /api/hardware/generate-assembly
pub async fn generate_assembly(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> AppResult<Json<GenerateResponse>> {
    generate(state, ReportKind::Assembly, body).await
}

/// POST /api/hardware/generate-firmware
pub async fn generate_firmware(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> AppResult<Json<GenerateResponse>> {
    generate(state, ReportKind::Firmware, body).await
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// POST /api/hardware/chat
///
/// Applies a natural-language edit to a section or a single component.
/// Both the user message and the assistant summary are kept in the
/// project's chat history. A component edit with a `creationId` moves the
/// component's generation entry to `awaitingJob`, or to `error` if the
/// edit fails.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> AppResult<Json<ChatResponse>> {
    body.validate()?;

    let component_scoped = body.target.kind == "component";
    let kind = if component_scoped {
        ReportKind::Components
    } else {
        body.target
            .kind
            .parse::<ReportKind>()
            .map_err(AppError::BadRequest)?
    };

    let req = EditRequest {
        project_id: body.project_id.clone(),
        report_id: body.target.report_id,
        user_id: body.user_id.clone(),
        instruction: body.message.clone(),
        component_id: body.target.component_id,
        component_name: body.target.component_name.clone(),
        context: body.context.clone(),
    };
    let selector = req.selector();
    if component_scoped && selector.is_none() {
        return Err(AppError::BadRequest(
            "component target requires componentId or componentName".into(),
        ));
    }

    claim_project(
        &state,
        EnsureProject {
            id: body.project_id.clone(),
            user_id: body.user_id.clone(),
            ..Default::default()
        },
    )
    .await?;

    ChatMessageRepo::create(
        &state.pool,
        &CreateChatMessage {
            project_id: &body.project_id,
            report_id: body.target.report_id,
            role: ROLE_USER,
            content: &body.message,
        },
    )
    .await?;

    // Tracker key: the component index when given, else its name.
    let tracked = match (&body.creation_id, component_scoped) {
        (Some(creation_id), true) => {
            let component_key = body
                .target
                .component_id
                .map(|i| i.to_string())
                .or_else(|| body.target.component_name.clone())
                .unwrap_or_default();
            Some((creation_id.clone(), component_key))
        }
        _ => None,
    };

    if let Some((creation_id, component_key)) = &tracked {
        state
            .tracker
            .lock()
            .await
            .mark_awaiting_job(creation_id, component_key);
    }

    let outcome = match state.synchronizer.edit(kind, &req).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some((creation_id, component_key)) = &tracked {
                state
                    .tracker
                    .lock()
                    .await
                    .mark_error(creation_id, component_key, e.to_string());
            }
            return Err(e.into());
        }
    };

    Ok(Json(ChatResponse {
        ai_response: outcome.summary,
        ai_content: outcome.payload,
    }))
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// GET /api/hardware/reports?projectId=&userId=&reportId=
///
/// Returns every written section of the pinned (or latest) report in one
/// normalized shape, with `hasError` set on failure placeholders.
pub async fn get_reports(
    State(state): State<AppState>,
    Query(params): Query<ReportsQuery>,
) -> AppResult<Json<ReportsResponse>> {
    let project = ProjectRepo::find_by_id(&state.pool, &params.project_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", &params.project_id))?;
    authorize(&project, params.user_id.as_deref())?;

    let report = match params.report_id {
        Some(id) => Some(
            ReportRepo::find_for_project(&state.pool, &project.id, id)
                .await?
                .ok_or_else(|| CoreError::not_found("Report", id))?,
        ),
        None => ReportRepo::find_latest_for_project(&state.pool, &project.id).await?,
    };

    let mut reports = BTreeMap::new();
    if let Some(report) = &report {
        for kind in ReportKind::ALL {
            if let Some(stored) = report.section(kind).filter(|v| !v.is_null()) {
                reports.insert(kind.section_name(), normalize_stored_section(kind, stored));
            }
        }
    }

    Ok(Json(ReportsResponse {
        success: true,
        count: reports.len(),
        reports,
        title: project.display_name().to_string(),
        report_id: report.map(|r| r.id),
    }))
}
