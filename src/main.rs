//! Main entry point for the todo service.
//!
//! Loads configuration from a YAML file, the environment (including `.env`)
//! and the command line, initializes logging and runs the API server until
//! it is interrupted.

use clap::Parser;
use todo_api::api::server;
use todo_api::cli::Cli;
use todo_api::config::{self, Config};
use todo_api::utils;
use tracing::{debug, error, info, warn};

/// Main entry point that initializes and runs the application.
///
/// # Initialization steps:
/// 1. Parse CLI arguments
/// 2. Load environment variables
/// 3. Resolve configuration (CLI > environment > config file > defaults)
/// 4. Initialize logging system
/// 5. Start API server
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let dotenv = dotenvy::dotenv();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    config.apply_env_overrides(|key| std::env::var(key).ok());
    cli.apply_to(&mut config);

    utils::init_logging(&config.logging);

    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Failed to load .env file: {}", e),
    }
    if let Some(path) = &cli.config {
        info!("Loaded configuration from {}", path);
    }
    if config.testing {
        warn!("Running in test mode, database is {}", config.database_url());
    }

    if let Err(e) = server::launch_server(&config).await {
        error!("Server failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}
