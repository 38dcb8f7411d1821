use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use std::io;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use health_log_domain::config::DomainConfig;
use health_log_domain::database::StorageConfig;
use health_log_domain::repository::{open_storage, RecordRepository};
use health_log_domain::services::RecordService;

mod args;
mod commands;

use args::{today, Args};
use commands::Context;

/// The main entry point for the healthlog command
///
/// This function:
/// 1. Initializes environment variables from .env file
/// 2. Sets up tracing for logging on stderr
/// 3. Opens the configured record storage and loads it once
/// 4. Runs the requested subcommand
fn main() -> Result<()> {
    // Load environment variables from .env file
    let dotenv_loaded = dotenv().is_ok();

    let args = Args::parse();

    // Initialize tracing for structured logging; stdout is reserved for output
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(env_filter)
        .init();

    if !dotenv_loaded {
        debug!(".env file not found or couldn't be read. Using environment variables.");
    }

    let mut storage_config = StorageConfig::from_env()?;
    if let Some(storage_type) = args.storage {
        storage_config.storage_type = storage_type;
    }
    if let Some(path) = &args.data_file {
        storage_config.sqlite_path = path.clone();
        storage_config.json_path = path.clone();
    }

    let domain_config = DomainConfig::from_env().with_policy(args.policy);

    let repository = RecordRepository::open(open_storage(&storage_config)?)?;
    let mut service = RecordService::new(repository, domain_config.fitness_policy);

    let context = Context {
        today: today(),
        storage: storage_config,
    };

    let stdout = io::stdout();
    commands::run(&mut service, args.command, &context, &mut stdout.lock())
}
