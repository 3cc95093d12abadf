/// Model provider configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API, without trailing slash.
    pub api_url: String,
    pub api_key: String,
    /// Model used for report generation.
    pub model: String,
    /// Smaller model used for change summaries.
    pub summary_model: String,
    /// Token cap for generation calls. Summaries use a fixed small cap.
    pub max_tokens: u32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                     |
    /// |----------------------|-----------------------------|
    /// | `MODEL_API_URL`      | `https://api.openai.com/v1` |
    /// | `MODEL_API_KEY`      | (required)                  |
    /// | `MODEL_NAME`         | `gpt-4o`                    |
    /// | `SUMMARY_MODEL_NAME` | `gpt-4o-mini`               |
    /// | `MODEL_MAX_TOKENS`   | `8192`                      |
    /// | `MODEL_TIMEOUT_SECS` | `180`                       |
    pub fn from_env() -> Self {
        let api_url = std::env::var("MODEL_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into())
            .trim_end_matches('/')
            .to_string();

        let api_key = std::env::var("MODEL_API_KEY").expect("MODEL_API_KEY must be set");

        let model = std::env::var("MODEL_NAME").unwrap_or_else(|_| "gpt-4o".into());
        let summary_model =
            std::env::var("SUMMARY_MODEL_NAME").unwrap_or_else(|_| "gpt-4o-mini".into());

        let max_tokens: u32 = std::env::var("MODEL_MAX_TOKENS")
            .unwrap_or_else(|_| "8192".into())
            .parse()
            .expect("MODEL_MAX_TOKENS must be a valid u32");

        let timeout_secs: u64 = std::env::var("MODEL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "180".into())
            .parse()
            .expect("MODEL_TIMEOUT_SECS must be a valid u64");

        Self {
            api_url,
            api_key,
            model,
            summary_model,
            max_tokens,
            timeout_secs,
        }
    }
}
