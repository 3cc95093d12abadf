//! Shared fixtures for pipeline integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use forgekit_llm::{CompletionRequest, LanguageModel, LlmError, ModelTier};
use forgekit_pipeline::ReportSynchronizer;
use serde_json::{json, Value};
use sqlx::PgPool;

/// A [`LanguageModel`] that replays scripted replies for primary calls.
///
/// Summary calls return `summary` when set, otherwise fail so the
/// deterministic fallback is used.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    summary: Option<String>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn replying(replies: impl IntoIterator<Item = Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn primary_calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.tier == ModelTier::Primary)
            .count()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        match request.tier {
            ModelTier::Summary => self.summary.clone().ok_or(LlmError::EmptyResponse),
            ModelTier::Primary => self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyResponse)),
        }
    }
}

pub fn synchronizer(pool: &PgPool, model: Arc<ScriptedModel>) -> ReportSynchronizer {
    ReportSynchronizer::new(pool.clone(), model)
}

pub fn component(name: &str) -> Value {
    json!({
        "component": name,
        "description": "Holds the water",
        "promptFor3DGeneration": "A 1L cylindrical reservoir with a screw lid",
        "printSpecifications": "0.2mm layers, 20% infill",
        "assemblyNotes": "Press the pump into the base",
        "printTime": "4h",
        "material": "PETG",
        "supports": "none"
    })
}

/// A valid `3d-components` payload for an automatic plant waterer.
pub fn plant_waterer() -> Value {
    json!({
        "project": "Plant Waterer",
        "description": "Waters a house plant on a schedule",
        "components": [component("Reservoir")],
        "generalNotes": "Print in PETG for water resistance"
    })
}

pub fn reply(value: &Value) -> Result<String, LlmError> {
    Ok(format!("Here is the design:\n```json\n{value}\n```"))
}
