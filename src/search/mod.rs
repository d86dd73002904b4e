//! Search client for the property API: form fields, one request per search,
//! loading and error state, and card rendering.

pub mod api;
pub mod card;

pub use api::{PropertyApi, SearchError};
pub use card::{render_card, render_results};

use crate::models::Property;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Shown for any failed search, whatever went wrong underneath
pub const SEARCH_ERROR_MESSAGE: &str = "Failed to fetch properties. Please try again.";

/// Search form fields. Empty fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub address: String,
    pub max_price: String,
    pub broker: String,
}

impl SearchQuery {
    /// Query string pairs for the non-empty fields, in form order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("address", &self.address),
            ("max_price", &self.max_price),
            ("broker", &self.broker),
        ]
        .into_iter()
        .map(|(key, value)| (key, value.trim()))
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key, value.to_string()))
        .collect()
    }
}

/// Anything that can answer a property search
#[async_trait]
pub trait PropertyIndex: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Property>, SearchError>;
}

/// Result list plus loading and error flags for one search view
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub properties: Vec<Property>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SearchState {
    pub fn begin(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// A failure sets the error and leaves the previous list in place
    pub fn finish(&mut self, result: Result<Vec<Property>, SearchError>) {
        self.is_loading = false;
        match result {
            Ok(properties) => {
                debug!("Search returned {} properties", properties.len());
                self.properties = properties;
                self.error = None;
            }
            Err(e) => {
                warn!(error = %e, "Property search failed");
                self.error = Some(SEARCH_ERROR_MESSAGE.to_string());
            }
        }
    }

    /// Run one search against `index`
    pub async fn run(&mut self, index: &dyn PropertyIndex, query: &SearchQuery) {
        self.begin();
        let result = index.search(query).await;
        self.finish(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingIndex {
        calls: Mutex<Vec<SearchQuery>>,
        fail: bool,
    }

    impl RecordingIndex {
        fn new(fail: bool) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl PropertyIndex for RecordingIndex {
        async fn search(&self, query: &SearchQuery) -> Result<Vec<Property>, SearchError> {
            self.calls.lock().unwrap().push(query.clone());
            if self.fail {
                return Err(SearchError::Status(500));
            }
            Ok(vec![serde_json::from_value(serde_json::json!({
                "address": "Oudegracht 12",
                "price": "1450"
            }))
            .unwrap()])
        }
    }

    #[test]
    fn test_query_pairs_skip_empty_fields() {
        let query = SearchQuery {
            address: "Oudegracht".into(),
            max_price: String::new(),
            broker: " YourHouse ".into(),
        };
        assert_eq!(
            query.query_pairs(),
            vec![
                ("address", "Oudegracht".to_string()),
                ("broker", "YourHouse".to_string())
            ]
        );

        assert!(SearchQuery::default().query_pairs().is_empty());
    }

    #[tokio::test]
    async fn test_search_issues_one_request() {
        let index = RecordingIndex::new(false);
        let query = SearchQuery {
            max_price: "1500".into(),
            ..Default::default()
        };
        let mut state = SearchState::default();

        state.run(&index, &query).await;

        assert_eq!(index.calls.lock().unwrap().len(), 1);
        assert!(!state.is_loading);
        assert_eq!(state.error, None);
        assert_eq!(state.properties.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_search_keeps_previous_list() {
        let mut state = SearchState::default();
        state.run(&RecordingIndex::new(false), &SearchQuery::default()).await;
        assert_eq!(state.properties.len(), 1);

        state.run(&RecordingIndex::new(true), &SearchQuery::default()).await;

        assert!(!state.is_loading);
        assert!(state.error.as_deref().is_some_and(|e| !e.is_empty()));
        assert_eq!(state.properties.len(), 1);
        assert_eq!(state.properties[0].address, "Oudegracht 12");
    }

    #[test]
    fn test_begin_sets_loading() {
        let mut state = SearchState {
            error: Some("old".into()),
            ..Default::default()
        };
        state.begin();
        assert!(state.is_loading);
        assert_eq!(state.error, None);
    }
}
