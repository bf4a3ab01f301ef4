mod commands;
mod handlers;
mod progress;
mod summary;
mod telegram;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use photozone_core::config::BotConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "photozone", about = "Photo enhancement chat bot")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Bot config file (TOML)
    #[arg(short, long, global = true, env = "PHOTOZONE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot
    Serve,
    /// Run the enhancement pipeline on a local photo
    Process(commands::process::ProcessArgs),
    /// Print or save the default config
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let load_config =
        || BotConfig::load(cli.config.as_deref()).context("Failed to load configuration");

    match &cli.command {
        Commands::Serve => commands::serve::run(&load_config()?).await,
        Commands::Process(args) => commands::process::run(args, &load_config()?).await,
        Commands::Config(args) => commands::config::run(args),
    }
}
