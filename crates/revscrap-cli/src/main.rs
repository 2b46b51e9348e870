use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{eyre, Context};
use commands::{config, fetch, serve};
use revscrap_config::{Config, PathManager};
use std::path::{Path, PathBuf};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "revscrap")]
#[command(about = "Revscrap - Download Google Play and App Store reviews as CSV")]
#[command(version)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web interface
    #[command(long_about = "Serve the review scraper page. Paste a Google Play or App Store link, press search, and the reviews download as a CSV file.")]
    Serve {
        /// Address to listen on, overriding server.bind
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
    /// Fetch reviews for one app URL and write them as CSV
    Fetch {
        /// Google Play or App Store app URL
        url: String,

        /// Output file (defaults to the suggested filename in the current directory)
        #[arg(long, short = 'o', value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration (defaults filled in)
    Show,
    /// Write a configuration file with every default spelled out
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

fn load_config(path: &Path) -> color_eyre::Result<Config> {
    let config = Config::load_or_default(path)
        .map_err(|e| eyre!("Failed to load config from {}: {}", path.display(), e))?;
    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration in {}: {}", path.display(), e))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathManager::default().config_file());

    // Config subcommands must work even when the file on disk is broken
    let config = match cli.command {
        Commands::Config { .. } => None,
        _ => Some(load_config(&config_path)?),
    };

    let logging_config = config.as_ref().map(|c| c.logging.clone()).unwrap_or_default();
    logging::init_logging(cli.verbose, cli.quiet, &logging_config)
        .map_err(|e| eyre!("{}", e))
        .wrap_err("Failed to initialize logging")?;

    let output = output::Output::new(cli.output, cli.quiet);

    match (cli.command, config) {
        (Commands::Serve { bind }, Some(config)) => serve::run_serve(config, bind, &output).await,
        (Commands::Fetch { url, out }, Some(config)) => fetch::run_fetch(&config, &url, out, &output).await,
        (Commands::Config { cmd }, _) => config::run_config(cmd, &config_path, &output),
        (_, None) => Err(eyre!("Configuration was not loaded")),
    }
}
