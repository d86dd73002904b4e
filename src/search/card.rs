use crate::models::Property;
use crate::search::SearchState;
use std::fmt::Write;

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

/// One listing as a small text card
pub fn render_card(property: &Property) -> String {
    let mut card = String::new();

    let _ = writeln!(card, "🏠 {}", or_dash(&property.address));
    let _ = writeln!(card, "   € {} per month", or_dash(&property.price));
    let _ = writeln!(
        card,
        "   {} m², {} bedrooms, energy label {}",
        or_dash(&property.area),
        or_dash(&property.bedrooms),
        property.energy_label.as_deref().unwrap_or("-")
    );
    let _ = writeln!(
        card,
        "   Furnished: {}, bills included: {}",
        yes_no(property.furnished),
        yes_no(property.including_bills)
    );
    let _ = writeln!(
        card,
        "   Status: {}, available from {}",
        or_dash(&property.status),
        or_dash(&property.available_from)
    );
    if !property.url.is_empty() {
        let _ = writeln!(card, "   {}", property.url);
    }

    card
}

/// The whole result view: error, empty notice or the card grid
pub fn render_results(state: &SearchState) -> String {
    if state.is_loading {
        return "Searching...\n".to_string();
    }

    let mut out = String::new();
    if let Some(error) = &state.error {
        let _ = writeln!(out, "⚠️  {}", error);
    }

    if state.properties.is_empty() {
        if state.error.is_none() {
            out.push_str("No properties found.\n");
        }
        return out;
    }

    let _ = writeln!(out, "Found {} properties\n", state.properties.len());
    for property in &state.properties {
        out.push_str(&render_card(property));
        out.push('\n');
    }
    out
}
