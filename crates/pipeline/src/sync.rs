//! Report synchronization.
//!
//! [`ReportSynchronizer`] turns a generation or edit request into a stored
//! report section:
//!
//! 1. call the model with the section's strict output schema,
//! 2. pull the first JSON object out of the raw text,
//! 3. normalize and validate it against the section schema,
//! 4. resolve the target report (pinned, latest for project, or new) under a
//!    per-project advisory lock and write only that section's column,
//! 5. summarize the result into an assistant chat message.
//!
//! A generation whose model call, extraction or validation fails stores a
//! placeholder section instead, so viewers can show the error. None of the
//! rejected output is persisted.

use std::sync::Arc;

use forgekit_core::json_extract::{extract_json_object, ExtractError};
use forgekit_core::report::{
    locate_component, normalize_stored_section, ComponentSelector, ReportKind, COMPONENTS_SCHEMA,
    COMPONENT_SCHEMA,
};
use forgekit_core::schema::SchemaViolation;
use forgekit_core::types::ReportId;
use forgekit_core::upsert::{resolve_upsert_target, ResolutionTier, UpsertTarget};
use forgekit_db::models::chat_message::{CreateChatMessage, ROLE_ASSISTANT};
use forgekit_db::models::project::EnsureProject;
use forgekit_db::models::report::Report;
use forgekit_db::repositories::{ChatMessageRepo, ProjectRepo, ReportRepo};
use forgekit_llm::{CompletionRequest, LanguageModel, LlmError, ModelTier, OutputSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use crate::prompts;

/// Output schema name for a single component in component-scoped edits.
const COMPONENT_SCHEMA_NAME: &str = "component";

/// Errors from the synchronization pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The provider call failed (transport or non-2xx).
    #[error("Model provider error: {0}")]
    Model(#[from] LlmError),

    /// The model answered, but no JSON object could be extracted.
    #[error("Invalid model output: {0}")]
    Output(#[from] ExtractError),

    /// The extracted JSON does not satisfy the section schema.
    #[error("Schema violation: {0}")]
    Schema(#[from] SchemaViolation),

    /// A pinned report id does not exist for the project.
    #[error("Report {0} not found for this project")]
    ReportNotFound(ReportId),

    /// A component-scoped edit did not match any stored component.
    #[error("Component {0} not found in the 3d-components section")]
    ComponentNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Input for generating a section from a project description.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub project_id: String,
    pub report_id: Option<ReportId>,
    pub user_id: Option<String>,
    pub title: Option<String>,
    /// Free-text product description.
    pub prompt_context: String,
    /// Section-specific extras such as the target microcontroller.
    pub section_params: Option<Value>,
}

impl GenerateRequest {
    fn project(&self) -> EnsureProject {
        EnsureProject {
            id: self.project_id.clone(),
            user_id: self.user_id.clone(),
            title: self.title.clone(),
            description: Some(self.prompt_context.clone()),
        }
    }

    fn project_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.project_id)
    }
}

/// Input for revising an existing section, or one component of it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub project_id: String,
    pub report_id: Option<ReportId>,
    pub user_id: Option<String>,
    pub instruction: String,
    /// Zero-based index of the component to edit.
    pub component_id: Option<usize>,
    /// Component name, used when no index is given.
    pub component_name: Option<String>,
    pub context: Option<Value>,
}

impl EditRequest {
    /// The component this edit is scoped to, if any. An index wins over a
    /// name.
    pub fn selector(&self) -> Option<ComponentSelector> {
        match (self.component_id, self.component_name.as_deref()) {
            (Some(i), _) => Some(ComponentSelector::Index(i)),
            (None, Some(name)) if !name.trim().is_empty() => {
                Some(ComponentSelector::Name(name.to_string()))
            }
            _ => None,
        }
    }

    fn project(&self) -> EnsureProject {
        EnsureProject {
            id: self.project_id.clone(),
            user_id: self.user_id.clone(),
            ..Default::default()
        }
    }
}

/// Result of a successful synchronization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub report_id: ReportId,
    pub tier: ResolutionTier,
    /// The validated section, or the single component for component edits.
    pub payload: Value,
    pub summary: String,
}

enum SectionWrite<'a> {
    Replace(&'a Value),
    Component {
        selector: &'a ComponentSelector,
        component: &'a Value,
    },
}

struct Written {
    report: Report,
    tier: ResolutionTier,
}

/// Runs model calls and persists their validated output into reports.
#[derive(Clone)]
pub struct ReportSynchronizer {
    pool: PgPool,
    model: Arc<dyn LanguageModel>,
}

impl ReportSynchronizer {
    pub fn new(pool: PgPool, model: Arc<dyn LanguageModel>) -> Self {
        Self { pool, model }
    }

    /// Generate one section from the project description.
    pub async fn generate(
        &self,
        kind: ReportKind,
        req: &GenerateRequest,
    ) -> Result<SyncOutcome, SyncError> {
        tracing::info!(project_id = %req.project_id, section = %kind, "Generating report section");

        if let Some(id) = req.report_id {
            self.current_report(&req.project_id, Some(id)).await?;
        }

        let request = CompletionRequest {
            tier: ModelTier::Primary,
            system: prompts::system_policy(kind).to_string(),
            prompt: prompts::generation_prompt(
                req.project_name(),
                &req.prompt_context,
                req.section_params.as_ref(),
            ),
            output_schema: Some(OutputSchema {
                name: kind.schema_name(),
                schema: kind.schema().to_json_schema(),
            }),
            max_tokens: None,
        };

        let payload = match self.structured(&request, kind).await {
            Ok(payload) => payload,
            Err(e @ (SyncError::Model(_) | SyncError::Output(_) | SyncError::Schema(_))) => {
                self.write_placeholder(kind, &req.project(), req.project_name(), &e)
                    .await;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let written = self
            .write(
                kind,
                &req.project(),
                req.report_id,
                SectionWrite::Replace(&payload),
            )
            .await?;

        let summary = self
            .summarize(kind, &payload, None, kind.fallback_summary(&payload))
            .await;
        self.record_summary(&req.project_id, written.report.id, &summary)
            .await;

        Ok(SyncOutcome {
            report_id: written.report.id,
            tier: written.tier,
            payload,
            summary,
        })
    }

    /// Revise a section according to a chat instruction.
    ///
    /// With a component selector (only valid for `3d-components`) the model
    /// sees and returns a single component, which replaces that element in
    /// place. Failures leave the stored section untouched.
    pub async fn edit(&self, kind: ReportKind, req: &EditRequest) -> Result<SyncOutcome, SyncError> {
        if let Some(selector) = req.selector() {
            if kind != ReportKind::Components {
                return Err(SyncError::InvalidRequest(format!(
                    "component edits apply to 3d-components, not {kind}"
                )));
            }
            return self.edit_component(req, &selector).await;
        }

        tracing::info!(project_id = %req.project_id, section = %kind, "Editing report section");

        let current = self.current_report(&req.project_id, req.report_id).await?;
        let current_section = current.as_ref().and_then(|r| current_section(kind, r));

        let request = CompletionRequest {
            tier: ModelTier::Primary,
            system: prompts::edit_policy(kind),
            prompt: prompts::edit_prompt(
                current_section.as_ref(),
                &req.instruction,
                req.context.as_ref(),
            ),
            output_schema: Some(OutputSchema {
                name: kind.schema_name(),
                schema: kind.schema().to_json_schema(),
            }),
            max_tokens: None,
        };
        let payload = self.structured(&request, kind).await?;

        let written = self
            .write(
                kind,
                &req.project(),
                req.report_id,
                SectionWrite::Replace(&payload),
            )
            .await?;

        let summary = self
            .summarize(
                kind,
                &payload,
                Some(&req.instruction),
                kind.fallback_summary(&payload),
            )
            .await;
        self.record_summary(&req.project_id, written.report.id, &summary)
            .await;

        Ok(SyncOutcome {
            report_id: written.report.id,
            tier: written.tier,
            payload,
            summary,
        })
    }

    async fn edit_component(
        &self,
        req: &EditRequest,
        selector: &ComponentSelector,
    ) -> Result<SyncOutcome, SyncError> {
        let kind = ReportKind::Components;
        tracing::info!(
            project_id = %req.project_id,
            component = %selector,
            "Editing report component"
        );

        let not_found = || SyncError::ComponentNotFound(selector.to_string());
        let report = self
            .current_report(&req.project_id, req.report_id)
            .await?
            .ok_or_else(not_found)?;
        let section = current_section(kind, &report).ok_or_else(not_found)?;
        let index = locate_component(&section, selector).ok_or_else(not_found)?;
        let existing = &section["components"][index];

        let request = CompletionRequest {
            tier: ModelTier::Primary,
            system: prompts::component_edit_policy(),
            prompt: prompts::component_edit_prompt(existing, &req.instruction, req.context.as_ref()),
            output_schema: Some(OutputSchema {
                name: COMPONENT_SCHEMA_NAME,
                schema: COMPONENT_SCHEMA.to_json_schema(),
            }),
            max_tokens: None,
        };
        let raw = self.model.complete(&request).await?;
        let component = COMPONENT_SCHEMA.conform(extract_json_object(&raw)?)?;

        let written = self
            .write(
                kind,
                &req.project(),
                Some(report.id),
                SectionWrite::Component {
                    selector,
                    component: &component,
                },
            )
            .await?;

        let name = component["component"].as_str().unwrap_or_default();
        let summary = self
            .summarize(
                kind,
                &component,
                Some(&req.instruction),
                format!("Updated component '{name}'."),
            )
            .await;
        self.record_summary(&req.project_id, written.report.id, &summary)
            .await;

        let tier = match req.report_id {
            Some(_) => ResolutionTier::Pinned,
            None => ResolutionTier::LatestForProject,
        };
        Ok(SyncOutcome {
            report_id: written.report.id,
            tier,
            payload: component,
            summary,
        })
    }

    /// Model call, extraction and schema conformance for a whole section.
    async fn structured(
        &self,
        request: &CompletionRequest,
        kind: ReportKind,
    ) -> Result<Value, SyncError> {
        let raw = self.model.complete(request).await?;
        let value = extract_json_object(&raw)?;
        let payload = kind.schema().conform(value).inspect_err(|e| {
            tracing::warn!(section = %kind, path = e.path(), error = %e, "Model output rejected");
        })?;
        Ok(payload)
    }

    /// The pinned report (which must exist) or the latest for the project.
    async fn current_report(
        &self,
        project_id: &str,
        pinned: Option<ReportId>,
    ) -> Result<Option<Report>, SyncError> {
        match pinned {
            Some(id) => ReportRepo::find_for_project(&self.pool, project_id, id)
                .await?
                .map(Some)
                .ok_or(SyncError::ReportNotFound(id)),
            None => Ok(ReportRepo::find_latest_for_project(&self.pool, project_id).await?),
        }
    }

    /// Resolve the target report and write one section in a single
    /// transaction holding the project's advisory lock.
    async fn write(
        &self,
        kind: ReportKind,
        project: &EnsureProject,
        pinned: Option<ReportId>,
        write: SectionWrite<'_>,
    ) -> Result<Written, SyncError> {
        let mut tx = self.pool.begin().await?;
        ReportRepo::lock_project(&mut *tx, &project.id).await?;
        ProjectRepo::ensure(&mut *tx, project).await?;

        let pinned_report = match pinned {
            Some(id) => Some(
                ReportRepo::find_for_project(&mut *tx, &project.id, id)
                    .await?
                    .ok_or(SyncError::ReportNotFound(id))?,
            ),
            None => None,
        };
        let latest = match pinned_report {
            Some(_) => None,
            None => ReportRepo::find_latest_for_project(&mut *tx, &project.id).await?,
        };
        let target = resolve_upsert_target(
            pinned_report.as_ref().map(|r| r.id),
            latest.as_ref().map(|r| r.id),
        );

        let payload = match write {
            SectionWrite::Replace(payload) => payload.clone(),
            SectionWrite::Component {
                selector,
                component,
            } => {
                let section = pinned_report
                    .as_ref()
                    .or(latest.as_ref())
                    .and_then(|r| current_section(kind, r))
                    .ok_or_else(|| SyncError::ComponentNotFound(selector.to_string()))?;
                splice_component(section, selector, component)?
            }
        };

        let report = match target {
            UpsertTarget::Update { report_id, .. } => {
                ReportRepo::update_section(&mut *tx, report_id, kind, &payload)
                    .await?
                    .ok_or(SyncError::ReportNotFound(report_id))?
            }
            UpsertTarget::Insert => {
                ReportRepo::insert_section(&mut *tx, &project.id, kind, &payload).await?
            }
        };
        tx.commit().await?;

        tracing::info!(
            project_id = %project.id,
            report_id = %report.id,
            section = %kind,
            tier = ?target.tier(),
            "Report section written"
        );
        Ok(Written {
            report,
            tier: target.tier(),
        })
    }

    /// Store an error placeholder in the section after a failed model call
    /// or rejected output. Never pinned: resolves to the latest report or a new one.
    async fn write_placeholder(
        &self,
        kind: ReportKind,
        project: &EnsureProject,
        project_name: &str,
        cause: &SyncError,
    ) {
        let placeholder = kind.placeholder(project_name, &cause.to_string());
        match self
            .write(kind, project, None, SectionWrite::Replace(&placeholder))
            .await
        {
            Ok(written) => tracing::warn!(
                project_id = %project.id,
                report_id = %written.report.id,
                section = %kind,
                error = %cause,
                "Stored placeholder after failed generation"
            ),
            Err(e) => tracing::error!(
                project_id = %project.id,
                section = %kind,
                error = %e,
                "Failed to store placeholder"
            ),
        }
    }

    async fn summarize(
        &self,
        kind: ReportKind,
        payload: &Value,
        instruction: Option<&str>,
        fallback: String,
    ) -> String {
        let request = CompletionRequest {
            tier: ModelTier::Summary,
            system: prompts::SUMMARY_POLICY.to_string(),
            prompt: prompts::summary_prompt(kind, payload, instruction),
            output_schema: None,
            max_tokens: None,
        };
        match self.model.complete(&request).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => fallback,
            Err(e) => {
                tracing::warn!(section = %kind, error = %e, "Summary call failed, using fallback");
                fallback
            }
        }
    }

    async fn record_summary(&self, project_id: &str, report_id: ReportId, summary: &str) {
        let message = CreateChatMessage {
            project_id,
            report_id: Some(report_id),
            role: ROLE_ASSISTANT,
            content: summary,
        };
        if let Err(e) = ChatMessageRepo::create(&self.pool, &message).await {
            tracing::error!(project_id, report_id = %report_id, error = %e, "Failed to store summary message");
        }
    }
}

/// A stored section in its canonical shape, without read-side flags.
fn current_section(kind: ReportKind, report: &Report) -> Option<Value> {
    report
        .section(kind)
        .map(|stored| kind.schema().normalize(normalize_stored_section(kind, stored)))
}

fn splice_component(
    mut section: Value,
    selector: &ComponentSelector,
    component: &Value,
) -> Result<Value, SyncError> {
    let index = locate_component(&section, selector)
        .ok_or_else(|| SyncError::ComponentNotFound(selector.to_string()))?;
    if let Some(slot) = section
        .get_mut("components")
        .and_then(Value::as_array_mut)
        .and_then(|components| components.get_mut(index))
    {
        *slot = component.clone();
    }
    Ok(COMPONENTS_SCHEMA.conform(section)?)
}
