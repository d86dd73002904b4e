use crate::scrapers::traits::PageFetcher;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Time given to client-side rendering after navigation completes
const RENDER_WAIT: Duration = Duration::from_secs(5);

/// Browser-based fetcher for brokers that render listings with JavaScript
pub struct BrowserFetcher {
    browser: Browser,
    cookie_modal_selector: Option<String>,
}

impl BrowserFetcher {
    pub fn new(cookie_modal_selector: Option<String>) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;

        Ok(Self {
            browser,
            cookie_modal_selector,
        })
    }

    fn render(browser: &Browser, url: &str, cookie_selector: Option<&str>) -> Result<String> {
        let tab = browser.new_tab().context("Failed to open tab")?;

        tab.navigate_to(url)
            .with_context(|| format!("Failed to navigate to {}", url))?;
        tab.wait_until_navigated()?;
        thread::sleep(RENDER_WAIT);

        if let Some(selector) = cookie_selector {
            match tab.find_element(selector) {
                Ok(button) => match button.click() {
                    Ok(_) => {
                        debug!("Dismissed cookie modal: {}", selector);
                        thread::sleep(Duration::from_secs(1));
                    }
                    Err(e) => warn!("Could not click cookie modal {}: {}", selector, e),
                },
                Err(_) => debug!("No cookie modal matched {}", selector),
            }
        }

        let html = tab.get_content().context("Failed to read page HTML")?;
        if let Err(e) = tab.close(true) {
            debug!("Failed to close tab: {}", e);
        }

        Ok(html)
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        info!("Rendering {} in headless Chrome...", url);

        let browser = self.browser.clone();
        let url = url.to_string();
        let cookie_selector = self.cookie_modal_selector.clone();

        let html = tokio::task::spawn_blocking(move || {
            Self::render(&browser, &url, cookie_selector.as_deref())
        })
        .await
        .context("Browser task panicked")??;

        debug!("Rendered {} bytes of HTML", html.len());
        Ok(html)
    }

    fn fetcher_name(&self) -> &'static str {
        "browser"
    }
}
