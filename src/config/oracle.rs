//! Oracle (LLM provider) configuration

use std::time::Duration;

use secrecy::Secret;

/// Configuration for the oracle collaborator.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// API key for the chat-completions endpoint.
    pub api_key: Secret<String>,
    /// Model identifier.
    pub model: String,
    /// Base URL of the chat-completions API.
    pub base_url: String,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum transport-level retries.
    pub max_retries: u32,
}

impl OracleConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: default_model(),
            base_url: default_base_url(),
            max_tokens: 1024,
            temperature: 0.9,
            timeout_secs: 120,
            max_retries: 3,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_model() -> String {
    "anthropic/claude-3.5-sonnet".to_string()
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = OracleConfig::new("key")
            .with_model("test/model")
            .with_base_url("http://localhost:9999/v1");
        assert_eq!(config.model, "test/model");
        assert_eq!(config.base_url, "http://localhost:9999/v1");
        assert_eq!(config.timeout(), Duration::from_secs(120));
    }
}
