use crate::models::Property;
use crate::scrapers::types::ListingFragment;
use anyhow::Result;
use async_trait::async_trait;

/// Retrieves the raw HTML of a broker index page.
/// Implemented by the plain HTTP client and by headless Chrome.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Name used in logs
    fn fetcher_name(&self) -> &'static str;
}

/// Turns one listing element into a structured property
#[async_trait]
pub trait ListingExtractor: Send + Sync {
    async fn extract(&self, listing: &ListingFragment) -> Result<Property>;
}
