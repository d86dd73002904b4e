//! LLM-backed listing extraction.

pub mod error;
pub mod llm;
pub mod prompt;

pub use error::{LlmError, LlmResult};
pub use llm::{ChatModel, LlmClient};

use crate::models::{BrokerConfig, Property};
use crate::scrapers::traits::ListingExtractor;
use crate::scrapers::types::ListingFragment;
use crate::utils::{preview, strip_code_blocks};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Attempts per listing when the provider keeps rate limiting us
pub const MAX_ATTEMPTS: u32 = 3;

/// Extracts one property per listing element with a chat model
pub struct LlmExtractor<M: ChatModel> {
    model: M,
    system_prompt: String,
    hints: Option<String>,
    base_url: Option<String>,
    max_attempts: u32,
}

impl<M: ChatModel> LlmExtractor<M> {
    pub fn new(model: M, broker: &BrokerConfig) -> Self {
        info!("LLM extractor ready with model: {}", model.model_name());
        Self {
            model,
            system_prompt: prompt::system_prompt(),
            hints: broker.extraction_hints.clone(),
            base_url: broker.base_url(),
            max_attempts: MAX_ATTEMPTS,
        }
    }

    async fn complete_with_retry(&self, user: &str) -> LlmResult<String> {
        let mut attempt = 1;
        loop {
            match self.model.complete_json(&self.system_prompt, user).await {
                Err(LlmError::RateLimited { wait, .. }) if attempt < self.max_attempts => {
                    warn!(
                        "Rate limit reached. Waiting {:.1} seconds before retry {}/{}...",
                        wait.as_secs_f64(),
                        attempt,
                        self.max_attempts
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) if e.is_rate_limit() => {
                    warn!("Max retries reached due to rate limits");
                    return Err(e);
                }
                other => return other,
            }
        }
    }
}

/// Read a property out of a model reply. Some models wrap the object in an
/// array or in code fences.
pub fn parse_reply(reply: &str) -> LlmResult<Property> {
    let value: serde_json::Value = serde_json::from_str(strip_code_blocks(reply)).map_err(|e| {
        LlmError::Parse(format!("{} in reply {:?}", e, preview(reply, 100)))
    })?;

    let value = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Parse("Reply was an empty array".into()))?,
        other => other,
    };

    let property: Property =
        serde_json::from_value(value).map_err(|e| LlmError::Parse(e.to_string()))?;

    if property.address.trim().is_empty() {
        return Err(LlmError::Parse("Reply has no address".into()));
    }

    Ok(property)
}

#[async_trait]
impl<M: ChatModel> ListingExtractor for LlmExtractor<M> {
    async fn extract(&self, listing: &ListingFragment) -> Result<Property> {
        debug!(
            "Processing listing fragment ({} chars): {}",
            listing.html.len(),
            preview(&listing.html, 200)
        );

        let user = prompt::user_prompt(&listing.html, self.hints.as_deref());
        let reply = self.complete_with_retry(&user).await?;
        let property = parse_reply(&reply)?;

        Ok(property.normalized(self.base_url.as_deref(), listing.href.as_deref()))
    }
}
