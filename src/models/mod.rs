use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

mod broker;

pub use broker::{BrokerConfig, BrokerRegistry};

/// Listing status the extractor falls back to when the page says nothing
pub const DEFAULT_STATUS: &str = "available";

/// Core property data model, one per extracted listing element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Property {
    /// Street address as shown on the listing
    #[serde(deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub address: String,
    /// Asking rent or price, number only
    #[serde(deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub price: String,
    /// Floor area in square meters, number only
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub area: String,
    /// Number of bedrooms, number only
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub bedrooms: String,
    /// Energy label, a letter A-G
    #[serde(default, deserialize_with = "optional_string")]
    #[schemars(with = "Option<String>")]
    pub energy_label: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    #[schemars(with = "bool")]
    pub furnished: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    #[schemars(with = "bool")]
    pub including_bills: bool,
    /// "available", "rented" or "option"
    #[serde(default = "default_status", deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub status: String,
    /// Date the property becomes available, YYYY-MM-DD
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub available_from: String,
    /// Link to the listing detail page
    #[serde(default, alias = "utl", deserialize_with = "lenient_string")]
    #[schemars(with = "String")]
    pub url: String,
}

impl Property {
    /// Tidy up raw extractor output. Relative links are resolved against
    /// `base` and an empty link falls back to `fallback_url`.
    pub fn normalized(mut self, base: Option<&str>, fallback_url: Option<&str>) -> Self {
        self.address = self.address.trim().to_string();
        self.price = self.price.trim().to_string();
        self.area = self.area.trim().to_string();
        self.bedrooms = self.bedrooms.trim().to_string();
        self.available_from = self.available_from.trim().to_string();

        self.energy_label = self
            .energy_label
            .map(|label| label.trim().to_uppercase())
            .filter(|label| !label.is_empty());

        let status = self.status.trim().to_lowercase();
        self.status = if status.is_empty() {
            DEFAULT_STATUS.to_string()
        } else {
            status
        };

        let mut url = crate::utils::clean_url(&self.url);
        if url.is_empty() {
            url = fallback_url.map(crate::utils::clean_url).unwrap_or_default();
        }
        self.url = match base {
            Some(base) if !url.is_empty() => crate::utils::resolve_url(base, &url),
            _ => url,
        };

        self
    }
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s,
        }
    }
}

/// Accept strings, numbers or null where a string is expected. LLMs are
/// not consistent about quoting "Number only" fields.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_string)
        .unwrap_or_default())
}

fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}

/// Accept `true`, `"true"`, `"yes"`, `1` and friends
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Bool(b)) => b,
        Some(Scalar::Number(n)) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Some(Scalar::Text(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "ja" | "1"
        ),
        None => false,
    };
    Ok(flag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_llm_output() {
        let property: Property = serde_json::from_value(json!({
            "address": "Oudegracht 12",
            "price": 1450,
            "area": "65",
            "bedrooms": 2,
            "energy_label": "b",
            "furnished": "True",
            "including_bills": "false",
            "status": "Available",
            "available_from": "2026-11-01",
            "utl": "/huren/oudegracht-12"
        }))
        .unwrap();

        assert_eq!(property.price, "1450");
        assert_eq!(property.bedrooms, "2");
        assert!(property.furnished);
        assert!(!property.including_bills);
        assert_eq!(property.url, "/huren/oudegracht-12");
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let property: Property =
            serde_json::from_value(json!({ "address": "Biltstraat 3", "price": "995" })).unwrap();

        assert_eq!(property.status, "available");
        assert_eq!(property.energy_label, None);
        assert!(!property.furnished);
        assert!(property.url.is_empty());
    }

    #[test]
    fn test_address_is_required() {
        let result = serde_json::from_value::<Property>(json!({ "price": "995" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_normalized_resolves_links() {
        let property: Property = serde_json::from_value(json!({
            "address": " Oudegracht 12 ",
            "price": "1450",
            "energy_label": "",
            "status": "",
            "url": "<https://www.example.nl/huren/1>"
        }))
        .unwrap();

        let property = property.normalized(Some("https://www.example.nl"), None);
        assert_eq!(property.address, "Oudegracht 12");
        assert_eq!(property.energy_label, None);
        assert_eq!(property.status, "available");
        assert_eq!(property.url, "https://www.example.nl/huren/1");

        let relative: Property =
            serde_json::from_value(json!({ "address": "A", "price": "1" })).unwrap();
        let relative = relative.normalized(Some("https://www.example.nl"), Some("/huren/2"));
        assert_eq!(relative.url, "https://www.example.nl/huren/2");
    }

    #[test]
    fn test_serialized_key_set() {
        let property: Property =
            serde_json::from_value(json!({ "address": "A", "price": "1" })).unwrap();
        let value = serde_json::to_value(&property).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();

        assert_eq!(
            keys,
            vec![
                "address",
                "area",
                "available_from",
                "bedrooms",
                "energy_label",
                "furnished",
                "including_bills",
                "price",
                "status",
                "url"
            ]
        );
    }
}
