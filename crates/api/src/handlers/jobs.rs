//! Handlers for the `/jobs` resource.
//!
//! Jobs queue a section generation or edit for the background worker. The
//! input is checked against the job type up front so the worker only sees
//! jobs it can run, and the caller is held to the same ownership and credit
//! rules as the synchronous `/hardware` endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use forgekit_core::error::CoreError;
use forgekit_core::job::{JobAction, JobKind};
use forgekit_core::types::DbId;
use forgekit_db::models::job::SubmitJob;
use forgekit_db::models::project::EnsureProject;
use forgekit_db::repositories::JobRepo;
use forgekit_pipeline::{EditRequest, GenerateRequest};

use crate::error::{AppError, AppResult};
use crate::handlers::access::{charge_generation, claim_project};
use crate::response::DataResponse;
use crate::state::AppState;

/// A job's input, parsed into the request type of its kind.
enum JobInput {
    Generate(GenerateRequest),
    Edit(EditRequest),
}

impl JobInput {
    fn project(&self) -> EnsureProject {
        match self {
            Self::Generate(req) => EnsureProject {
                id: req.project_id.clone(),
                user_id: req.user_id.clone(),
                title: req.title.clone(),
                description: Some(req.prompt_context.clone()),
            },
            Self::Edit(req) => EnsureProject {
                id: req.project_id.clone(),
                user_id: req.user_id.clone(),
                ..Default::default()
            },
        }
    }
}

/// Reject input that does not deserialize into the request type of `kind`.
fn check_input(kind: JobKind, input: &serde_json::Value) -> AppResult<JobInput> {
    let result = match kind.action {
        JobAction::Generate => {
            serde_json::from_value::<GenerateRequest>(input.clone()).map(JobInput::Generate)
        }
        JobAction::Edit => serde_json::from_value::<EditRequest>(input.clone()).map(JobInput::Edit),
    };
    result.map_err(|e| AppError::BadRequest(format!("Invalid input for {kind}: {e}")))
}

/// POST /api/jobs
///
/// Submit a new background job. Returns 201 with the created job in
/// `pending` status. Generation jobs are metered at submission.
pub async fn submit_job(
    State(state): State<AppState>,
    Json(input): Json<SubmitJob>,
) -> AppResult<impl IntoResponse> {
    let kind: JobKind = input.job_type.parse()?;
    let parsed = check_input(kind, &input.input)?;

    claim_project(&state, parsed.project()).await?;
    if let JobInput::Generate(req) = &parsed {
        charge_generation(&state, req.user_id.as_deref()).await?;
    }

    let job = JobRepo::submit(&state.pool, &input).await?;

    tracing::info!(job_id = job.id, job_type = %job.job_type, "Job submitted");

    Ok((StatusCode::CREATED, Json(DataResponse { data: job })))
}

/// GET /api/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let job = JobRepo::find_by_id(&state.pool, job_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Job", job_id))?;
    Ok(Json(DataResponse { data: job }))
}

#[cfg(test)]
mod tests {
    use forgekit_core::report::ReportKind;
    use serde_json::json;

    use super::*;

    #[test]
    fn generate_input_needs_project_and_context() {
        let kind = JobKind::generate(ReportKind::Firmware);
        assert!(check_input(kind, &json!({ "projectId": "p1", "promptContext": "x" })).is_ok());
        assert!(check_input(kind, &json!({ "projectId": "p1" })).is_err());
    }

    #[test]
    fn generate_input_carries_the_caller() {
        let kind = JobKind::generate(ReportKind::Components);
        let parsed = check_input(
            kind,
            &json!({ "projectId": "p1", "userId": "alice", "promptContext": "x" }),
        )
        .unwrap();
        let project = parsed.project();
        assert_eq!(project.id, "p1");
        assert_eq!(project.user_id.as_deref(), Some("alice"));
    }

    #[test]
    fn edit_input_needs_instruction() {
        let kind = JobKind::edit(ReportKind::Assembly);
        assert!(check_input(kind, &json!({ "projectId": "p1", "instruction": "x" })).is_ok());
        assert!(check_input(kind, &json!({ "projectId": "p1" })).is_err());
    }
}
