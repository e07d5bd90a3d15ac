pub mod persist;
mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Locations searched when no `--config` is given, first match wins.
const DEFAULT_PATHS: &[&str] = &["./tbtools.toml", "~/.config/tbtools/config.toml"];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<ToolConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: ToolConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// The configuration for one session plus where it is saved.
///
/// Edits go through [`ConfigStore::set`], which marks the store dirty;
/// [`ConfigStore::save_if_modified`] writes it back on exit.
#[derive(Debug)]
pub struct ConfigStore {
    pub config: ToolConfig,
    path: PathBuf,
    modified: bool,
}

impl ConfigStore {
    /// Open the config at `custom_path`, or the first default location that
    /// exists. A missing file yields defaults that will be saved to the
    /// custom path or `./tbtools.toml`.
    pub fn open(custom_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = custom_path {
            let config = if path.exists() {
                load_config(path)?
            } else {
                tracing::debug!("Config {:?} does not exist yet, using defaults", path);
                ToolConfig::default()
            };
            return Ok(Self::new(config, path.to_path_buf()));
        }

        for path_str in DEFAULT_PATHS {
            let path = shellexpand::tilde(path_str);
            let path = Path::new(path.as_ref());
            if path.exists() {
                tracing::debug!("Using config {:?}", path);
                return Ok(Self::new(load_config(path)?, path.to_path_buf()));
            }
        }

        Ok(Self::new(ToolConfig::default(), PathBuf::from(DEFAULT_PATHS[0])))
    }

    fn new(config: ToolConfig, path: PathBuf) -> Self {
        Self {
            config,
            path,
            modified: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Set one key, marking the store for saving when the value changes.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let before = self.config.get(key);
        self.config.set(key, value)?;
        if self.config.get(key) != before {
            self.modified = true;
        }
        Ok(())
    }

    /// Write the config back if anything changed. Returns whether it wrote.
    pub fn save_if_modified(&mut self) -> Result<bool> {
        if !self.modified {
            return Ok(false);
        }
        persist::save_config(&self.path, &self.config)?;
        self.modified = false;
        Ok(true)
    }
}

/// Validate configuration
fn validate_config(config: &ToolConfig) -> Result<()> {
    if !config.fps.is_finite() || config.fps <= 0.0 {
        anyhow::bail!("fps must be a positive number, got {}", config.fps);
    }

    for (key, dir) in [
        ("project_root", &config.project_root),
        ("scenes_root", &config.scenes_root),
        ("animatics_root", &config.animatics_root),
    ] {
        if !dir.is_empty() && !Path::new(dir).exists() {
            tracing::warn!("Configured {} does not exist: {:?}", key, dir);
        }
    }

    Ok(())
}
