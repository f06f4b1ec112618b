//! IssuePilot CLI entry point.

use clap::Parser;

use issuepilot::cli::{commands, Cli, Commands};
use issuepilot::infrastructure::{config::ConfigLoader, logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err:#}");
            std::process::exit(1);
        }
    };

    logging::init(&config.logging);

    let result = match cli.command {
        Commands::Serve => commands::serve(config).await,
        Commands::Train(args) => commands::train(config, args).await,
        Commands::Sync(args) => commands::sync(config, args).await,
        Commands::Triage => commands::triage(config).await,
    };

    if let Err(err) = result {
        tracing::error!(error = %err, "command failed");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
