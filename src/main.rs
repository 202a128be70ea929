//! Mentor CLI entry point.

use clap::Parser;

use mentor::cli::commands::{execute, AppContext};
use mentor::cli::{handle_error, Cli};
use mentor::infrastructure::config::ConfigLoader;
use mentor::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    let config = match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => handle_error(err, json_mode),
    };

    // Held for the life of the process so buffered file logs are flushed.
    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, json_mode),
    };

    let ctx = match AppContext::open(config).await {
        Ok(ctx) => ctx,
        Err(err) => handle_error(err, json_mode),
    };

    if let Err(err) = execute(cli.command, &ctx, json_mode).await {
        handle_error(err, json_mode);
    }
}
