use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Connection
    pub api_url: Option<String>,

    // Local directories
    pub state_dir: Option<String>,
    pub export_dir: Option<String>,

    // Preferences
    pub default_target_lufs: Option<f64>,
    /// "light" or "dark"
    pub theme: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
