//! Error types for the LLM client.

use std::time::Duration;
use thiserror::Error;

pub type LlmResult<T> = std::result::Result<T, LlmError>;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Missing API key, unknown provider
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failed, timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Provider asked us to back off
    #[error("Rate limited, retry in {wait:?}: {message}")]
    RateLimited { wait: Duration, message: String },

    /// Non-2xx response other than a rate limit
    #[error("API error: {0}")]
    Api(String),

    /// Reply was not the JSON we asked for
    #[error("Parse error: {0}")]
    Parse(String),
}

impl LlmError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }
}
