use std::path::PathBuf;
use std::time::Duration;

/// Parameters for one scrape run against one broker
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Area substituted into the broker URL template
    pub area: String,
    /// Value for a `{max_price}` placeholder, if the template has one
    pub max_price: Option<u32>,
    /// Upper bound on listing elements sent to the extractor. `None` processes all.
    pub limit: Option<usize>,
    /// Pause between consecutive extraction calls
    pub listing_delay: Duration,
    /// Where result and debug files go
    pub output_dir: PathBuf,
    /// Also keep the fetched page HTML for inspection
    pub debug: bool,
}

/// A cleaned listing element ready for extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFragment {
    /// Position on the index page, zero based
    pub index: usize,
    /// Simplified HTML of the element
    pub html: String,
    /// First link inside the element, used when the extractor finds none
    pub href: Option<String>,
}

/// What a scrape run produced
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    pub url: String,
    /// Listing elements matched by the selector
    pub listings_found: usize,
    /// Listing elements handed to the extractor
    pub listings_processed: usize,
    pub properties: Vec<crate::models::Property>,
    pub output_file: Option<PathBuf>,
    pub debug_file: Option<PathBuf>,
}
