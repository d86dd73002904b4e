use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Runtime settings read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub brokers_config: PathBuf,
    pub broker_name: Option<String>,
    pub area: String,
    pub max_price: u32,
    pub limit: usize,
    pub listing_delay: Duration,
    pub broker_delay: Duration,
    pub api_url: String,
    pub llm: LlmSettings,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// `<provider>/<model>`, e.g. `groq/llama-3.1-8b-instant`
    pub provider: String,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub groq_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            output_dir: PathBuf::from(var_or("OUTPUT_DIR", "output")),
            brokers_config: PathBuf::from(var_or("BROKERS_CONFIG", "config/brokers.json")),
            broker_name: var("BROKER_NAME"),
            area: var_or("AREA", "utrecht"),
            max_price: parse_or("MAX_PRICE", 2000)?,
            limit: parse_or("LIMIT", 5)?,
            listing_delay: Duration::from_secs(parse_or("LISTING_DELAY_SECS", 20)?),
            broker_delay: Duration::from_secs(parse_or("BROKER_DELAY_SECS", 30)?),
            api_url: var_or("API_URL", "http://localhost:8000"),
            llm: LlmSettings::from_env()?,
        })
    }
}

impl LlmSettings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            provider: var_or("LLM_PROVIDER", "groq/llama-3.1-8b-instant"),
            base_url: var("LLM_BASE_URL"),
            temperature: parse_or("LLM_TEMPERATURE", 0.1)?,
            max_tokens: parse_or("LLM_MAX_TOKENS", 2000)?,
            groq_api_key: var("GROQ_API_KEY"),
            anthropic_api_key: var("ANTHROPIC_API_KEY"),
            openai_api_key: var("OPENAI_API_KEY"),
        })
    }
}

/// Unset and empty variables are treated the same
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| default.to_string())
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
