//! Configuration persistence using toml_edit to preserve formatting and comments.

use super::ToolConfig;
use anyhow::{Context, Result};
use std::path::Path;
use toml_edit::{DocumentMut, Item};

/// Save the config to a TOML file.
///
/// Keys already present in the file are updated in place so comments and
/// ordering survive; keys the file does not have are appended.
pub fn save_config(path: &Path, config: &ToolConfig) -> Result<()> {
    let mut doc: DocumentMut = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        content
            .parse()
            .with_context(|| format!("Failed to parse config file: {:?}", path))?
    } else {
        DocumentMut::new()
    };

    // Round-trip through toml to get every field in its serialized form.
    let serialized =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config")?;
    let fresh: DocumentMut = serialized
        .parse()
        .with_context(|| "Failed to parse serialized config")?;

    for (key, item) in fresh.iter() {
        match doc.get_mut(key) {
            Some(existing) => replace_value(existing, item),
            None => {
                doc[key] = item.clone();
            }
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }
    std::fs::write(path, doc.to_string())
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    tracing::debug!("Saved config to {:?}", path);
    Ok(())
}

/// Swap the value while keeping the existing item's decor (comments, spacing).
fn replace_value(existing: &mut Item, fresh: &Item) {
    match (existing.as_value_mut(), fresh.as_value()) {
        (Some(old), Some(new)) => {
            let decor = old.decor().clone();
            *old = new.clone();
            *old.decor_mut() = decor;
        }
        _ => *existing = fresh.clone(),
    }
}
