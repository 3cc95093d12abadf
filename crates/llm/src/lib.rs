//! Language model provider client.
//!
//! The pipeline talks to [`LanguageModel`]; [`OpenAiClient`] implements it
//! over any OpenAI-compatible chat completions endpoint with strict JSON
//! schema output.

pub mod config;
pub mod model;
pub mod openai;

pub use config::LlmConfig;
pub use model::{CompletionRequest, LanguageModel, LlmError, ModelTier, OutputSchema};
pub use openai::OpenAiClient;
