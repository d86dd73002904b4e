use crate::models::BrokerConfig;
use crate::output::{save_debug_html, save_properties_json};
use crate::scrapers::listings::select_listings;
use crate::scrapers::traits::{ListingExtractor, PageFetcher};
use crate::scrapers::types::{ScrapeOptions, ScrapeReport};
use anyhow::Result;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Fetch one broker index page and extract its listings one at a time
pub struct PropertyScraper<'a> {
    broker: &'a BrokerConfig,
    fetcher: &'a dyn PageFetcher,
    extractor: &'a dyn ListingExtractor,
}

impl<'a> PropertyScraper<'a> {
    pub fn new(
        broker: &'a BrokerConfig,
        fetcher: &'a dyn PageFetcher,
        extractor: &'a dyn ListingExtractor,
    ) -> Self {
        Self {
            broker,
            fetcher,
            extractor,
        }
    }

    pub async fn scrape(&self, options: &ScrapeOptions) -> Result<ScrapeReport> {
        let start = Instant::now();
        let result = self.run(options).await;
        info!(
            "Total time taken: {:.2} seconds",
            start.elapsed().as_secs_f64()
        );
        result
    }

    async fn run(&self, options: &ScrapeOptions) -> Result<ScrapeReport> {
        let url = self.broker.listing_url(&options.area, options.max_price);
        let mut report = ScrapeReport {
            url: url.clone(),
            ..Default::default()
        };

        info!("Fetching HTML from URL: {} ({})", url, self.fetcher.fetcher_name());
        let html = self.fetcher.fetch(&url).await?;
        info!("Received HTML length: {} characters", html.len());

        if options.debug {
            let path = save_debug_html(&html, &options.output_dir).await?;
            debug!("Saved page HTML to {}", path.display());
            report.debug_file = Some(path);
        }

        let listings = select_listings(&html, &self.broker.listing_selector)?;
        report.listings_found = listings.len();
        info!(
            "Found {} property listings using selector: {}",
            listings.len(),
            self.broker.listing_selector
        );

        if listings.is_empty() {
            warn!("No listings found! Check the selector or page structure.");
            if report.debug_file.is_none() {
                let path = save_debug_html(&html, &options.output_dir).await?;
                info!("Saved full HTML for debugging to: {}", path.display());
                report.debug_file = Some(path);
            }
            return Ok(report);
        }

        let listing_count = options
            .limit
            .map_or(listings.len(), |limit| limit.min(listings.len()));
        report.listings_processed = listing_count;

        for (i, listing) in listings.iter().take(listing_count).enumerate() {
            info!("Processing listing {}/{}", i + 1, listing_count);

            if i > 0 && !options.listing_delay.is_zero() {
                info!(
                    "Waiting {} seconds before processing next listing...",
                    options.listing_delay.as_secs()
                );
                tokio::time::sleep(options.listing_delay).await;
            }

            match self.extractor.extract(listing).await {
                Ok(property) => {
                    info!("✓ Extracted {} ({})", property.address, property.price);
                    report.properties.push(property);
                }
                Err(e) => {
                    warn!(listing = listing.index, error = %e, "✗ Failed to extract property data");
                }
            }
        }

        info!(
            "Successfully processed {}/{} properties",
            report.properties.len(),
            listing_count
        );

        let path = save_properties_json(
            &report.properties,
            &self.broker.name,
            &options.area,
            &options.output_dir,
        )
        .await?;
        info!("💾 Results saved to: {}", path.display());
        report.output_file = Some(path);

        Ok(report)
    }
}
