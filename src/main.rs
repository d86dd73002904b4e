mod config;
mod extract;
mod models;
mod output;
mod scrapers;
mod search;
#[cfg(test)]
mod test_support;
mod utils;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::{LlmSettings, Settings};
use extract::{LlmClient, LlmExtractor};
use models::{BrokerConfig, BrokerRegistry};
use scrapers::{PropertyScraper, ScrapeOptions};
use search::{PropertyApi, SearchQuery, SearchState};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape broker listing pages into structured property data")]
struct Cli {
    /// Verbose logging and keep fetched page HTML
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape one broker (or all of them) for an area
    Scrape(ScrapeArgs),
    /// Query the property API and show the results as cards
    Search(SearchArgs),
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// Broker name from the configuration, or "all" to scrape every broker
    #[arg(short, long)]
    broker: Option<String>,

    /// Area to search (e.g. utrecht, amsterdam)
    #[arg(short, long)]
    area: Option<String>,

    /// Maximum number of listings to extract per broker
    #[arg(short, long)]
    limit: Option<usize>,

    /// Extract every listing on the page
    #[arg(long, conflicts_with = "limit")]
    no_limit: bool,

    /// Value for brokers whose URL has a {max_price} placeholder
    #[arg(long)]
    max_price: Option<u32>,

    /// Post the extracted properties to the property API
    #[arg(long)]
    publish: bool,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Part of the address to match
    #[arg(long)]
    address: Option<String>,

    /// Highest price to show
    #[arg(long)]
    max_price: Option<String>,

    /// Only listings from this broker
    #[arg(long)]
    broker: Option<String>,

    /// Property API base URL (defaults to API_URL)
    #[arg(long)]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // RUST_LOG wins over --debug
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.debug { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::from_env()?;

    match cli.command {
        Command::Scrape(args) => run_scrape(args, cli.debug, &settings).await,
        Command::Search(args) => run_search(args, &settings).await,
    }
}

async fn run_scrape(args: ScrapeArgs, debug: bool, settings: &Settings) -> Result<()> {
    info!("🏠 Listing Scout");

    let registry = BrokerRegistry::load(&settings.brokers_config)?;

    let options = ScrapeOptions {
        area: args.area.unwrap_or_else(|| settings.area.clone()),
        max_price: Some(args.max_price.unwrap_or(settings.max_price)),
        limit: if args.no_limit {
            None
        } else {
            Some(args.limit.unwrap_or(settings.limit))
        },
        listing_delay: settings.listing_delay,
        output_dir: settings.output_dir.clone(),
        debug,
    };

    let api = if args.publish {
        Some(PropertyApi::new(settings.api_url.clone())?)
    } else {
        None
    };

    let broker_name = args.broker.or_else(|| settings.broker_name.clone());

    if broker_name
        .as_deref()
        .is_some_and(|name| name.eq_ignore_ascii_case("all"))
    {
        info!("Scraping ALL brokers for area: {}", options.area);
        let mut total = 0;

        for (i, broker) in registry.brokers.iter().enumerate() {
            if i > 0 {
                info!(
                    "Waiting {} seconds before scraping next broker...",
                    settings.broker_delay.as_secs()
                );
                tokio::time::sleep(settings.broker_delay).await;
            }

            match scrape_broker(broker, &options, &settings.llm, api.as_ref()).await {
                Ok(count) => total += count,
                Err(e) => error!("Error scraping broker {}: {:#}", broker.name, e),
            }
        }

        info!("=== Overall Scraping Summary ===");
        info!("Total properties scraped across all brokers: {}", total);
        return Ok(());
    }

    let broker = registry.find(broker_name.as_deref()).with_context(|| {
        format!(
            "Broker '{}' not found in configuration",
            broker_name.as_deref().unwrap_or_default()
        )
    })?;
    info!("Using broker: {}, area: {}", broker.name, options.area);

    scrape_broker(broker, &options, &settings.llm, api.as_ref()).await?;
    Ok(())
}

async fn scrape_broker(
    broker: &BrokerConfig,
    options: &ScrapeOptions,
    llm: &LlmSettings,
    api: Option<&PropertyApi>,
) -> Result<usize> {
    info!("=== Scraping broker: {} ===", broker.name);

    let fetcher = scrapers::fetcher_for(broker)?;
    let client = LlmClient::from_settings(llm)?;
    info!("LLM provider: {:?} at {}", client.provider(), client.base_url());
    let extractor = LlmExtractor::new(client, broker);

    let report = PropertyScraper::new(broker, fetcher.as_ref(), &extractor)
        .scrape(options)
        .await?;

    info!("--- {} Scraping Summary ---", broker.name);
    info!("Area: {}", options.area);
    info!("Index page: {}", report.url);
    info!(
        "Listings found: {}, processed: {}, extracted: {}",
        report.listings_found,
        report.listings_processed,
        report.properties.len()
    );
    if let Some(path) = &report.output_file {
        info!("Output file: {}", path.display());
    }
    if let Some(path) = &report.debug_file {
        info!("Debug HTML: {}", path.display());
    }

    for property in &report.properties {
        println!("{}", search::render_card(property));
    }

    if let Some(api) = api {
        let saved = api.publish(&report.properties, &broker.name).await;
        info!("Published {}/{} properties to {}", saved, report.properties.len(), api.base_url());
    }

    Ok(report.properties.len())
}

async fn run_search(args: SearchArgs, settings: &Settings) -> Result<()> {
    let api = PropertyApi::new(args.api_url.unwrap_or_else(|| settings.api_url.clone()))?;
    let query = SearchQuery {
        address: args.address.unwrap_or_default(),
        max_price: args.max_price.unwrap_or_default(),
        broker: args.broker.unwrap_or_default(),
    };

    info!("Searching {}/properties...", api.base_url());
    let mut state = SearchState::default();
    state.run(&api, &query).await;
    print!("{}", search::render_results(&state));

    Ok(())
}
