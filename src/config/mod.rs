mod file_config;

pub use file_config::FileConfig;

use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

use crate::lufs::LufsTarget;
use crate::theme::Theme;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_STATE_DIR: &str = ".audionorm";

/// Values taken from the command line. Anything set in the TOML file wins.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub api_url: Option<String>,
    pub state_dir: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub default_target_lufs: Option<f64>,
    pub theme: Option<Theme>,
    /// Keep the session in memory only.
    pub ephemeral: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub state_dir: PathBuf,
    pub export_dir: PathBuf,
    pub default_target: LufsTarget,
    pub default_theme: Theme,
    pub ephemeral: bool,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let api_url = file
            .api_url
            .or_else(|| cli.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            bail!("api_url must be an http(s) URL, got {:?}", api_url);
        }

        let state_dir = file
            .state_dir
            .map(PathBuf::from)
            .or_else(|| cli.state_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR));
        if state_dir.exists() && !state_dir.is_dir() {
            bail!("state_dir is not a directory: {:?}", state_dir);
        }

        let export_dir = file
            .export_dir
            .map(PathBuf::from)
            .or_else(|| cli.export_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_target = match file.default_target_lufs.or(cli.default_target_lufs) {
            Some(value) => LufsTarget::new(value).map_err(|e| anyhow!("default_target_lufs: {}", e))?,
            None => LufsTarget::default(),
        };

        let default_theme = match file.theme {
            Some(name) => name.parse::<Theme>().map_err(|e| anyhow!(e))?,
            None => cli.theme.unwrap_or_default(),
        };

        Ok(Self {
            api_url,
            state_dir,
            export_dir,
            default_target,
            default_theme,
            ephemeral: cli.ephemeral,
        })
    }
}
