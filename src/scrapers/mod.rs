pub mod browser;
pub mod http;
pub mod listings;
pub mod pipeline;
pub mod traits;
pub mod types;

pub use browser::BrowserFetcher;
pub use http::HttpFetcher;
pub use pipeline::PropertyScraper;
pub use traits::PageFetcher;
pub use types::ScrapeOptions;

use crate::models::BrokerConfig;
use anyhow::Result;

/// Pick the fetcher a broker needs
pub fn fetcher_for(broker: &BrokerConfig) -> Result<Box<dyn PageFetcher>> {
    if broker.render_js {
        Ok(Box::new(BrowserFetcher::new(broker.cookie_modal_selector.clone())?))
    } else {
        Ok(Box::new(HttpFetcher::new()?))
    }
}
