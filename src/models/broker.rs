use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One listing source and how to read its index page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrokerConfig {
    pub name: String,
    /// Base URL used to resolve relative listing links
    #[serde(default)]
    pub domain: String,
    /// Index URL template with `{area}` and optional `{max_price}` placeholders
    #[serde(rename = "url")]
    pub url_template: String,
    /// CSS selector matching one element per listing
    pub listing_selector: String,
    /// Cookie consent button to dismiss when rendering with a browser
    #[serde(default)]
    pub cookie_modal_selector: Option<String>,
    /// Fetch through headless Chrome instead of a plain HTTP request
    #[serde(default)]
    pub render_js: bool,
    /// Extra instructions for the extractor, e.g. which element holds the price
    #[serde(default)]
    pub extraction_hints: Option<String>,
}

impl BrokerConfig {
    /// Build the index URL for an area
    pub fn listing_url(&self, area: &str, max_price: Option<u32>) -> String {
        let url = self.url_template.replace("{area}", area);
        match max_price {
            Some(max_price) => url.replace("{max_price}", &max_price.to_string()),
            None => url,
        }
    }

    /// Base for resolving relative links, the configured domain or else the
    /// origin of the URL template
    pub fn base_url(&self) -> Option<String> {
        if !self.domain.trim().is_empty() {
            let domain = self.domain.trim();
            return Some(if domain.starts_with("http://") || domain.starts_with("https://") {
                domain.to_string()
            } else {
                format!("https://{}", domain)
            });
        }

        url::Url::parse(&self.url_template)
            .ok()
            .map(|u| u.origin().ascii_serialization())
            .filter(|origin| origin != "null")
    }
}

/// Contents of the brokers configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrokerRegistry {
    #[serde(default)]
    pub brokers: Vec<BrokerConfig>,
}

impl BrokerRegistry {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read brokers config {}", path.display()))?;
        let registry: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid brokers config {}", path.display()))?;

        info!("Loaded {} brokers from {}", registry.brokers.len(), path.display());
        Ok(registry)
    }

    /// Case-insensitive lookup. Without a name the first broker is used.
    pub fn find(&self, name: Option<&str>) -> Option<&BrokerConfig> {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => self
                .brokers
                .iter()
                .find(|b| b.name.eq_ignore_ascii_case(name)),
            None => self.brokers.first(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broker(template: &str) -> BrokerConfig {
        BrokerConfig {
            name: "Example".to_string(),
            domain: String::new(),
            url_template: template.to_string(),
            listing_selector: "div.listing".to_string(),
            cookie_modal_selector: None,
            render_js: false,
            extraction_hints: None,
        }
    }

    #[test]
    fn test_listing_url_matches_template() {
        let b = broker("https://example.com/{area}/listings");
        assert_eq!(
            b.listing_url("utrecht", None),
            "https://example.com/utrecht/listings"
        );
    }

    #[test]
    fn test_listing_url_with_max_price() {
        let b = broker("https://example.com/huur/{area}/0-{max_price}");
        assert_eq!(
            b.listing_url("amsterdam", Some(2000)),
            "https://example.com/huur/amsterdam/0-2000"
        );
        assert_eq!(
            b.listing_url("amsterdam", None),
            "https://example.com/huur/amsterdam/0-{max_price}"
        );
    }

    #[test]
    fn test_base_url() {
        let mut b = broker("https://www.example.com/{area}/listings");
        assert_eq!(b.base_url().as_deref(), Some("https://www.example.com"));

        b.domain = "makelaar.nl".to_string();
        assert_eq!(b.base_url().as_deref(), Some("https://makelaar.nl"));
    }

    #[test]
    fn test_registry_lookup() {
        let registry: BrokerRegistry = serde_json::from_str(
            r#"{"brokers": [
                {"name": "YourHouse", "url": "https://a.nl/{area}", "listing_selector": "li"},
                {"name": "Pararius", "url": "https://b.nl/{area}", "listing_selector": "section", "render_js": true}
            ]}"#,
        )
        .unwrap();

        assert_eq!(registry.find(Some("pararius")).unwrap().name, "Pararius");
        assert!(registry.find(Some("pararius")).unwrap().render_js);
        assert_eq!(registry.find(None).unwrap().name, "YourHouse");
        assert_eq!(registry.find(Some("  ")).unwrap().name, "YourHouse");
        assert!(registry.find(Some("missing")).is_none());
    }
}
