//! CLI entry and dispatch.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tgmark_core::config::{self, Config};

mod commands;

/// Environment variable holding the log filter (e.g. `debug`, `tgmark_pipeline=debug`).
const LOG_ENV: &str = "TGMARK_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser)]
#[command(name = "tgmark")]
#[command(version)]
#[command(about = "Convert Markdown into Telegram text and message entities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of $TGMARK_HOME/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Convert Markdown to plain text and entities (JSON)
    Convert {
        /// Markdown file to read (default: stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Leave \( \) and \[ \] math untouched
        #[arg(long = "no-latex")]
        no_latex: bool,
    },
    /// Convert and split into message-sized chunks (JSON)
    Split {
        /// Markdown file to read (default: stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Maximum UTF-16 length of one chunk (default from config)
        #[arg(long, value_name = "N")]
        max_length: Option<usize>,
    },
    /// Run the full pipeline: text messages, code files and diagrams
    Process {
        /// Markdown file to read (default: stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Maximum UTF-16 length of one text message (default from config)
        #[arg(long, value_name = "N")]
        max_length: Option<usize>,

        /// Write file and photo attachments into this directory
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Print a fresh config built from the defaults
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, config } = cli;
    let config_path = config.unwrap_or_else(config::paths::config_path);

    match command {
        Commands::Convert { file, no_latex } => {
            let config = load_config(&config_path)?;
            let markdown = read_input(file.as_deref())?;
            commands::convert::run(&markdown, &config, no_latex)
        }
        Commands::Split { file, max_length } => {
            let config = load_config(&config_path)?;
            let markdown = read_input(file.as_deref())?;
            commands::split::run(&markdown, &config, max_length)
        }
        Commands::Process {
            file,
            max_length,
            out_dir,
        } => {
            let config = load_config(&config_path)?;
            let markdown = read_input(file.as_deref())?;
            commands::process::run(&markdown, &config, max_length, out_dir.as_deref()).await
        }
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path(&config_path);
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(&config_path),
            ConfigCommands::Generate => commands::config::generate(),
        },
    }
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load_from(path).with_context(|| format!("load config from {}", path.display()))
}

/// Reads Markdown from `file`, or from stdin when no file is given.
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display())),
        None => {
            let mut markdown = String::new();
            std::io::stdin()
                .read_to_string(&mut markdown)
                .context("read stdin")?;
            Ok(markdown)
        }
    }
}
