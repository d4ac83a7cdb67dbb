use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;
mod commands;

use cli::{Cli, Commands, OutputFormat};
use quiver::config::{Config, LogLevel};

fn setup_logging(log_level: &LogLevel) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quiver")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("quiver.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(log_level.as_filter());
    }

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    info!(
        "Log level: {} (from {})",
        log_level.as_filter(),
        if std::env::var("RUST_LOG").is_ok() { "RUST_LOG env" } else { "config" }
    );
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<()> {
    let quiet = cli.quiet;
    match cli.command {
        Commands::List {
            category,
            installed,
            available,
            format,
        } => commands::agent::list(category, installed, available, OutputFormat::resolve(format), &config),
        Commands::Show { name, format } => commands::agent::show(&name, OutputFormat::resolve(format), &config),
        Commands::Install {
            name,
            local,
            force,
            format,
        } => commands::agent::install(&name, local, force, OutputFormat::resolve(format), quiet, &config),
        Commands::Uninstall { name, format } => {
            commands::agent::uninstall(&name, OutputFormat::resolve(format), quiet, &config)
        }
        Commands::Update { name, force, format } => {
            commands::agent::update(&name, force, OutputFormat::resolve(format), quiet, &config)
        }
        Commands::Search {
            query,
            category,
            tags,
            limit,
            format,
        } => commands::agent::search(&query, category, tags, limit, OutputFormat::resolve(format), &config),
        Commands::Validate { path, format } => {
            commands::agent::validate(&path, OutputFormat::resolve(format), cli.verbose, &config)
        }
        Commands::Backups { format } => commands::backup::list(OutputFormat::resolve(format), &config),
        Commands::Restore { id } => commands::backup::restore(&id, quiet, &config),
        Commands::Catalog { check, format } => commands::catalog::run(check, OutputFormat::resolve(format), &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments first
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging with log level from config (or RUST_LOG env var)
    setup_logging(&config.log_level).context("Failed to setup logging")?;

    info!("Starting quiver with config from: {:?}", cli.config);

    // Run the command
    run(cli, config).context("Command failed")?;

    Ok(())
}
