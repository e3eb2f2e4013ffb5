mod commands;
mod engines;
mod logging;
mod tui;
mod ui;

use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{debug, info};

use rpnpad_core::config::{ConfigError, KeypadConfig};

#[derive(Parser)]
#[command(name = "rpnpad")]
#[command(about = "Soft-key keypad front-end for an RPN evaluator", long_about = None)]
struct Cli {
    /// Config file (default: discover rpnpad.yml upwards from the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Append logs to this file (the TUI logs nowhere otherwise)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive keypad (default)
    Tui,
    /// Run an action script against the transcript evaluator
    Replay { file: PathBuf },
    /// Show the soft-key pages the evaluator knows
    Pages {
        /// Page word or short name, e.g. `math`
        word: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, Some(Commands::Tui) | None);

    match &cli.log_file {
        Some(path) => logging::init_file_logging(path)?,
        None if !interactive => logging::init_stderr_logging(),
        None => {}
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Replay { file }) => match commands::run_replay(&file, &config).await {
            Ok(()) => Ok(()),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Some(Commands::Pages { word, json }) => {
            match commands::run_pages(&config, word.as_deref(), json) {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Tui) | None => {
            ui::theme::init(config.theme);
            tui::run_tui(&config).await
        }
    }
}

/// Explicit path, else discovered file, else built-in defaults
fn load_config(explicit: Option<&Path>) -> Result<KeypadConfig, ConfigError> {
    if let Some(path) = explicit {
        let config = KeypadConfig::load(path)?;
        info!(path = %path.display(), "loaded config");
        return Ok(config);
    }

    let cwd = std::env::current_dir()?;
    match KeypadConfig::discover(&cwd) {
        Ok((path, config)) => {
            info!(path = %path.display(), "loaded config");
            Ok(config)
        }
        Err(ConfigError::NotFound { searched }) => {
            debug!(searched = searched.len(), "no config file, using defaults");
            Ok(KeypadConfig::default())
        }
        Err(e) => Err(e),
    }
}
