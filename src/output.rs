use crate::models::Property;
use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};

fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Keep file names portable whatever the broker or area is called
fn file_safe(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Write the run's properties as a pretty JSON array and return the path
pub async fn save_properties_json(
    properties: &[Property],
    broker_name: &str,
    area: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let filename = output_dir.join(format!(
        "properties_{}_{}_{}.json",
        file_safe(broker_name),
        file_safe(area),
        timestamp()
    ));

    let json = serde_json::to_string_pretty(properties)?;
    tokio::fs::write(&filename, json)
        .await
        .with_context(|| format!("Failed to write {}", filename.display()))?;

    Ok(filename)
}

/// Keep a fetched page around for inspecting a selector that matched nothing
pub async fn save_debug_html(html: &str, output_dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let filename = output_dir.join(format!("debug_html_{}.html", timestamp()));
    tokio::fs::write(&filename, html)
        .await
        .with_context(|| format!("Failed to write {}", filename.display()))?;

    Ok(filename)
}
