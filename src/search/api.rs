use crate::models::Property;
use crate::search::{PropertyIndex, SearchQuery};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Request failed: {0}")]
    Network(String),

    #[error("API returned status {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    Decode(String),
}

/// HTTP client for the external property API
#[derive(Clone)]
pub struct PropertyApi {
    client: Client,
    base_url: String,
}

/// Body for `POST /properties/`
#[derive(Serialize)]
struct NewProperty<'a> {
    #[serde(flatten)]
    property: &'a Property,
    broker: &'a str,
}

impl PropertyApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SearchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_request(&self, query: &SearchQuery) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}/properties", self.base_url))
            .query(&query.query_pairs())
    }

    /// Post every property, logging and skipping the ones the API rejects.
    /// Returns how many were saved.
    pub async fn publish(&self, properties: &[Property], broker: &str) -> usize {
        let endpoint = format!("{}/properties/", self.base_url);
        let mut saved = 0;

        for property in properties {
            let body = NewProperty { property, broker };
            let result = self
                .client
                .post(&endpoint)
                .json(&body)
                .send()
                .await
                .and_then(|r| r.error_for_status());

            match result {
                Ok(_) => {
                    info!("✓ Saved property to database: {}", property.address);
                    saved += 1;
                }
                Err(e) => {
                    warn!(error = %e, "✗ Error saving property {} to database", property.address);
                }
            }
        }

        saved
    }
}

#[async_trait]
impl PropertyIndex for PropertyApi {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Property>, SearchError> {
        let request = self
            .search_request(query)
            .build()
            .map_err(|e| SearchError::Network(e.to_string()))?;
        debug!("GET {}", request.url());

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))
    }
}
