#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use forgekit_api::config::ServerConfig;
use forgekit_api::router::build_app_router;
use forgekit_api::state::AppState;
use forgekit_llm::{CompletionRequest, LanguageModel, LlmError, ModelTier};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults and metering disabled.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        generation_credit_cost: 0,
    }
}

/// A [`LanguageModel`] replaying scripted replies to primary calls.
/// Summary calls fail so responses carry the deterministic fallback.
#[derive(Default)]
pub struct StubModel {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
}

impl StubModel {
    pub fn replying(replies: impl IntoIterator<Item = Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
        }
    }
}

#[async_trait]
impl LanguageModel for StubModel {
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

/// Build the full application router with the production middleware stack
/// and a model that is never expected to be called.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, StubModel::default(), test_config())
}

pub fn build_test_app_with(pool: PgPool, model: StubModel, config: ServerConfig) -> Router {
    build_app_router(AppState::new(pool, config, Arc::new(model)))
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

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
    Ok(value.to_string())
}

pub fn generate_body(project_id: &str) -> Value {
    json!({
        "projectData": {
            "id": project_id,
            "title": "Plant Waterer",
            "description": "An automatic plant waterer with a small pump"
        }
    })
}
