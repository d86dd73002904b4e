//! Minimal client for OpenAI-compatible chat completion endpoints.
//!
//! Groq, OpenAI, Anthropic and Ollama all expose `/chat/completions` with the
//! same request shape, so one client covers every provider the scraper can be
//! pointed at through `LLM_PROVIDER`.

use crate::config::LlmSettings;
use crate::extract::error::{LlmError, LlmResult};
use crate::utils::{parse_rate_limit_wait, DEFAULT_RATE_LIMIT_WAIT};
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Something that can answer a system + user prompt with a JSON string
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete_json(&self, system: &str, user: &str) -> LlmResult<String>;

    fn model_name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
    OpenAI,
    Anthropic,
    Ollama,
}

impl Provider {
    pub fn base_url(&self) -> &'static str {
        match self {
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Anthropic => "https://api.anthropic.com/v1",
            Provider::Ollama => "http://localhost:11434/v1",
        }
    }

    /// Split `groq/llama-3.1-8b-instant` into provider and model.
    /// A bare model name is sent to OpenAI.
    pub fn parse(value: &str) -> LlmResult<(Provider, String)> {
        let Some((prefix, model)) = value.trim().split_once('/') else {
            return Ok((Provider::OpenAI, value.trim().to_string()));
        };

        let provider = match prefix.to_lowercase().as_str() {
            "groq" => Provider::Groq,
            "openai" => Provider::OpenAI,
            "anthropic" => Provider::Anthropic,
            "ollama" => Provider::Ollama,
            other => {
                return Err(LlmError::Config(format!("Unknown LLM provider: {}", other)))
            }
        };

        if model.is_empty() {
            return Err(LlmError::Config(format!("No model in LLM_PROVIDER {:?}", value)));
        }

        Ok((provider, model.to_string()))
    }

    /// The provider's own key first, then GROQ, ANTHROPIC, OPENAI in that order
    fn api_key(&self, settings: &LlmSettings) -> Option<String> {
        let own = match self {
            Provider::Groq => settings.groq_api_key.clone(),
            Provider::OpenAI => settings.openai_api_key.clone(),
            Provider::Anthropic => settings.anthropic_api_key.clone(),
            Provider::Ollama => return None,
        };

        own.or_else(|| settings.groq_api_key.clone())
            .or_else(|| settings.anthropic_api_key.clone())
            .or_else(|| settings.openai_api_key.clone())
    }
}

#[derive(Clone)]
pub struct LlmClient {
    http_client: Client,
    provider: Provider,
    model: String,
    api_key: Option<String>,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmClient {
    pub fn from_settings(settings: &LlmSettings) -> LlmResult<Self> {
        let (provider, model) = Provider::parse(&settings.provider)?;

        let api_key = provider.api_key(settings);
        if api_key.is_none() && provider != Provider::Ollama {
            return Err(LlmError::Config(
                "No API key set (GROQ_API_KEY, ANTHROPIC_API_KEY or OPENAI_API_KEY)".into(),
            ));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| LlmError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            provider,
            model,
            api_key,
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| provider.base_url().to_string()),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// Classify a failed response. 429s and bodies mentioning a rate limit
/// become `RateLimited` so the caller can back off and retry.
fn error_from_response(status: StatusCode, retry_after: Option<Duration>, body: String) -> LlmError {
    let lower = body.to_lowercase();
    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || lower.contains("rate limit")
        || lower.contains("ratelimit")
        || lower.contains("rate_limit");

    if rate_limited {
        let wait = parse_rate_limit_wait(&body)
            .or(retry_after)
            .unwrap_or(DEFAULT_RATE_LIMIT_WAIT);
        return LlmError::RateLimited { wait, message: body };
    }

    LlmError::Api(format!("{}: {}", status, body))
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete_json(&self, system: &str, user: &str) -> LlmResult<String> {
        let start = Instant::now();

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message { role: "system", content: system },
                Message { role: "user", content: user },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let mut builder = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "LLM request failed");
            LlmError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<f64>().ok())
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok());
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "LLM API error");
            return Err(error_from_response(status, retry_after, body));
        }

        let raw: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = raw
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Api("Empty response from model".into()))?;

        debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis(),
            "LLM chat completion"
        );

        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
