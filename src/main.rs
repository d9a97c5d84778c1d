use anyhow::{Context, Result};
use clap::Parser;
use rustyline::{history::FileHistory, CompletionType, Config, Editor};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use audionorm_client::cli_style::{get_styles, print_error, print_goodbye};
use audionorm_client::config::{AppConfig, CliConfig, FileConfig};
use audionorm_client::shell::{App, CommandExecutionResult, ShellHelper};
use audionorm_client::storage::{ClientStorage, FileStorage, MemoryStorage};
use audionorm_client::theme::Theme;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path = PathBuf::from(s);
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path))
}

#[derive(Parser, Debug)]
#[command(styles = get_styles(), version = env!("APP_VERSION"))]
struct CliArgs {
    /// Link to open on start, e.g. an OAuth redirect or a verification link.
    pub open: Option<String>,

    /// Path to a TOML config file. Values there override the flags below.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Base URL of the AudioNorm backend.
    #[clap(long, env = "AUDIONORM_API_URL")]
    pub api_url: Option<String>,

    /// Directory holding the session token and preferences.
    #[clap(long, value_parser = parse_path)]
    pub state_dir: Option<PathBuf>,

    /// Where exported files are written.
    #[clap(long, value_parser = parse_path)]
    pub export_dir: Option<PathBuf>,

    /// Loudness target used for files without one (-30 to -6).
    #[clap(long, allow_hyphen_values = true)]
    pub target_lufs: Option<f64>,

    /// Initial theme when none was saved: light or dark.
    #[clap(long)]
    pub theme: Option<String>,

    /// Keep the session in memory only.
    #[clap(long)]
    pub ephemeral: bool,
}

impl CliArgs {
    fn to_cli_config(&self) -> Result<CliConfig> {
        let theme = self
            .theme
            .as_deref()
            .map(str::parse::<Theme>)
            .transpose()
            .map_err(anyhow::Error::msg)?;
        Ok(CliConfig {
            api_url: self.api_url.clone(),
            state_dir: self.state_dir.clone(),
            export_dir: self.export_dir.clone(),
            default_target_lufs: self.target_lufs,
            theme,
            ephemeral: self.ephemeral,
        })
    }
}

fn open_storage(config: &AppConfig) -> Result<Arc<dyn ClientStorage>> {
    if config.ephemeral {
        info!("Using in-memory client storage");
        return Ok(Arc::new(MemoryStorage::new()));
    }
    let storage = FileStorage::in_dir(&config.state_dir)
        .with_context(|| format!("Could not open state directory {:?}", config.state_dir))?;
    info!("Client storage at {:?}", storage.path());
    Ok(Arc::new(storage))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config()?, file_config)?;
    info!("Using backend at {}", config.api_url);

    let storage = open_storage(&config)?;
    let mut app = App::new(config, storage)?;
    app.print_welcome();
    app.start(cli_args.open.as_deref()).await;
    app.render();

    let rl_config = Config::builder()
        .completion_type(CompletionType::List)
        .build();
    let mut rl = Editor::<ShellHelper, FileHistory>::with_config(rl_config)?;
    rl.set_helper(Some(ShellHelper::new()));

    loop {
        let readline = rl.readline(&app.prompt());
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match app.execute_line(&line).await {
                    CommandExecutionResult::Ok => app.render(),
                    CommandExecutionResult::Exit => break,
                    CommandExecutionResult::Error(err) => {
                        if app.flash().is_empty() {
                            print_error(&app.palette(), err.trim_end());
                        } else {
                            app.render();
                        }
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                warn!("Line editor failed: {:?}", e);
                break;
            }
        }
    }

    print_goodbye(&app.palette());
    Ok(())
}
