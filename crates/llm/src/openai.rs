//! Client for OpenAI-compatible `/chat/completions` endpoints.
//!
//! Structured calls send `response_format: json_schema` with
//! `strict: true`; the raw message text is still returned untouched so the
//! caller owns extraction and validation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::LlmConfig;
use crate::model::{CompletionRequest, LanguageModel, LlmError, ModelTier};

/// Token cap for summary calls.
const SUMMARY_MAX_TOKENS: u32 = 300;

/// HTTP client for a single model provider.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    config: LlmConfig,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a client with its own connection pool and the configured
    /// request timeout.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("forgekit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }

    fn build_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        let (model, default_max) = match request.tier {
            ModelTier::Primary => (self.config.model.as_str(), self.config.max_tokens),
            ModelTier::Summary => (self.config.summary_model.as_str(), SUMMARY_MAX_TOKENS),
        };

        let response_format = request.output_schema.as_ref().map(|s| {
            json!({
                "type": "json_schema",
                "json_schema": {
                    "name": s.name,
                    "strict": true,
                    "schema": s.schema,
                }
            })
        });

        ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            max_tokens: request.max_tokens.unwrap_or(default_max),
            response_format,
        }
    }

    /// Ensure the response has a success status code, otherwise return
    /// [`LlmError::Api`] with the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn first_text(response: ChatResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .filter_map(|c| c.message.content)
        .find(|text| !text.trim().is_empty())
        .ok_or(LlmError::EmptyResponse)
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = self.build_body(request);
        tracing::debug!(
            model = body.model,
            max_tokens = body.max_tokens,
            structured = body.response_format.is_some(),
            "Sending model request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let parsed = response.json::<ChatResponse>().await?;
        first_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::OutputSchema;

    use super::*;

    fn config() -> LlmConfig {
        LlmConfig {
            api_url: "http://localhost:9999/v1".into(),
            api_key: "test-key".into(),
            model: "big-model".into(),
            summary_model: "small-model".into(),
            max_tokens: 4096,
            timeout_secs: 5,
        }
    }

    fn request(tier: ModelTier, schema: bool) -> CompletionRequest {
        CompletionRequest {
            tier,
            system: "policy".into(),
            prompt: "a lamp".into(),
            output_schema: schema.then(|| OutputSchema {
                name: "components_report",
                schema: json!({ "type": "object" }),
            }),
            max_tokens: None,
        }
    }

    #[test]
    fn structured_body_uses_primary_model_and_strict_schema() {
        let client = OpenAiClient::with_client(reqwest::Client::new(), config());
        let req = request(ModelTier::Primary, true);
        let body = serde_json::to_value(client.build_body(&req)).unwrap();

        assert_eq!(body["model"], "big-model");
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "a lamp");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
        assert_eq!(
            body["response_format"]["json_schema"]["name"],
            "components_report"
        );
    }

    #[test]
    fn summary_body_has_no_response_format() {
        let client = OpenAiClient::with_client(reqwest::Client::new(), config());
        let req = request(ModelTier::Summary, false);
        let body = serde_json::to_value(client.build_body(&req)).unwrap();

        assert_eq!(body["model"], "small-model");
        assert_eq!(body["max_tokens"], SUMMARY_MAX_TOKENS);
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn first_text_skips_empty_choices() {
        let parsed: ChatResponse = serde_json::from_value(json!({
            "choices": [
                { "message": { "content": null } },
                { "message": { "content": "{\"a\":1}" } }
            ]
        }))
        .unwrap();
        assert_eq!(first_text(parsed).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn blank_content_is_empty_response() {
        let parsed: ChatResponse =
            serde_json::from_value(json!({ "choices": [{ "message": { "content": "  " } }] }))
                .unwrap();
        assert!(matches!(first_text(parsed), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn api_error_exposes_status() {
        let err = LlmError::Api {
            status: 429,
            body: "slow down".into(),
        };
        assert_eq!(err.status_code(), Some(429));
        assert_eq!(LlmError::EmptyResponse.status_code(), None);
    }
}
