//! Shared fixtures for worker integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use forgekit_db::models::job::SubmitJob;
use forgekit_db::repositories::JobRepo;
use forgekit_llm::{CompletionRequest, LanguageModel, LlmError, ModelTier};
use forgekit_pipeline::ReportSynchronizer;
use forgekit_worker::{JobProcessor, WorkerConfig};
use serde_json::{json, Value};
use sqlx::PgPool;

/// Replays scripted replies for primary calls; summary calls fail.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
}

impl ScriptedModel {
    pub fn replying(replies: impl IntoIterator<Item = Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
        }
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        match request.tier {
            ModelTier::Summary => Err(LlmError::EmptyResponse),
            ModelTier::Primary => self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyResponse)),
        }
    }
}

pub fn processor(pool: &PgPool, model: ScriptedModel) -> JobProcessor {
    let synchronizer = ReportSynchronizer::new(pool.clone(), Arc::new(model));
    JobProcessor::new(pool.clone(), synchronizer, WorkerConfig::default())
}

pub async fn submit(pool: &PgPool, job_type: &str, input: Value) -> i64 {
    JobRepo::submit(
        pool,
        &SubmitJob {
            job_type: job_type.to_string(),
            input,
        },
    )
    .await
    .unwrap()
    .id
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

pub fn plant_waterer() -> Value {
    json!({
        "project": "Plant Waterer",
        "description": "Waters a house plant on a schedule",
        "components": [component("Reservoir")],
        "generalNotes": "Print in PETG for water resistance"
    })
}

pub fn reply(value: &Value) -> Result<String, LlmError> {
    Ok(value.to_string())
}
