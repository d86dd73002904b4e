use crate::models::Property;
use schemars::schema_for;

const INSTRUCTION: &str = "\
You extract rental property data from a single HTML listing element.
Extract these property fields from the HTML:
- address: Property address
- price: Number only
- area: Number only
- bedrooms: Number only
- energy_label: Letter A-G
- furnished: \"true\"/\"false\"
- including_bills: \"true\"/\"false\"
- status: \"available\"/\"rented\"/\"option\"
- available_from: YYYY-MM-DD
- url: Property URL

Use an empty string for anything the HTML does not show.
Return a single JSON object and nothing else.";

/// System prompt with the instruction and the property JSON schema
pub fn system_prompt() -> String {
    let schema = serde_json::to_string_pretty(&schema_for!(Property)).unwrap_or_default();
    format!("{}\n\nJSON schema:\n{}", INSTRUCTION, schema)
}

/// User prompt for one listing
pub fn user_prompt(listing_html: &str, hints: Option<&str>) -> String {
    match hints.map(str::trim).filter(|h| !h.is_empty()) {
        Some(hints) => format!("Notes for this site: {}\n\nHTML:\n{}", hints, listing_html),
        None => format!("HTML:\n{}", listing_html),
    }
}
