//! Backup listing and restore

use colored::*;
use eyre::{Context, Result};

use quiver::config::Config;

use super::{block_on, registry};
use crate::cli::OutputFormat;

pub fn list(format: OutputFormat, config: &Config) -> Result<()> {
    let registry = registry(config)?;
    let snapshots = block_on(registry.list_backups())?.context("Failed to read backup index")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshots)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&snapshots)?),
        OutputFormat::Text => {
            println!("{}", "Backups:".bold());
            println!();
            if snapshots.is_empty() {
                println!("  {} No backups yet", "(none)".dimmed());
            }
            // Newest first
            for snapshot in snapshots.iter().rev() {
                println!(
                    "  {} {}",
                    snapshot.id.bold(),
                    snapshot.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string().dimmed()
                );
                println!("    {}", snapshot.source.display());
            }
        }
    }

    Ok(())
}

pub fn restore(id: &str, quiet: bool, config: &Config) -> Result<()> {
    let registry = registry(config)?;
    let snapshot = block_on(registry.restore_backup(id))?.with_context(|| format!("Failed to restore backup {}", id))?;

    if !quiet {
        println!("{} Restored {} from {}", "✓".green(), snapshot.source.display(), snapshot.id.bold());
    }
    Ok(())
}
