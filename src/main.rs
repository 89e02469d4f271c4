//! Arcadia CLI entry point.

use anyhow::Result;
use clap::Parser;

use arcadia::cli::commands::{batch, config as config_cmd, run};
use arcadia::cli::{Cli, Commands};
use arcadia::infrastructure::config::ConfigLoader;
use arcadia::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = dispatch(cli.command, cli.config.as_deref(), cli.json).await {
        arcadia::cli::handle_error(err, cli.json);
    }
}

async fn dispatch(
    command: Commands,
    config_path: Option<&std::path::Path>,
    json: bool,
) -> Result<()> {
    let config = match config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    // The guard flushes the log file on drop; keep it for the whole run.
    let log_config = LogConfig::from_settings(&config.logging)?;
    let _logger = LoggerImpl::init(&log_config)?;

    match command {
        Commands::Batch(args) => batch::execute(args, config, json).await,
        Commands::Run(args) => run::execute(args, config, json).await,
        Commands::Config => config_cmd::execute(config, json),
    }
}
