//! Category catalog browsing

use colored::*;
use eyre::{Result, bail};

use quiver::catalog::Divergence;
use quiver::config::Config;

use super::{block_on, registry};
use crate::cli::OutputFormat;

pub fn run(check: bool, format: OutputFormat, config: &Config) -> Result<()> {
    let registry = registry(config)?;

    if !check {
        let catalog = registry.catalog();
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(catalog)?),
            OutputFormat::Yaml => println!("{}", serde_yaml::to_string(catalog)?),
            OutputFormat::Text => {
                for (category, entry) in &catalog.categories {
                    println!("{} {}", category.to_string().cyan().bold(), entry.description.dimmed());
                    for name in &entry.agents {
                        println!("  {}", name);
                    }
                    println!();
                }
            }
        }
        return Ok(());
    }

    let divergences = block_on(registry.catalog_divergences())?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&divergences)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&divergences)?),
        OutputFormat::Text => {
            if divergences.is_empty() {
                println!("{} Catalog matches the registry", "✓".green());
            }
            for divergence in &divergences {
                match divergence {
                    Divergence::Missing { name, category } => {
                        println!("  {} {} listed under {} but not found", "✗".red(), name.bold(), category)
                    }
                    Divergence::Miscategorized {
                        name,
                        catalog,
                        declared,
                    } => println!(
                        "  {} {} listed under {} but declares {}",
                        "⚠".yellow(),
                        name.bold(),
                        catalog,
                        declared
                    ),
                    Divergence::Unlisted { name, declared } => {
                        println!("  {} {} ({}) is not in the catalog", "○".dimmed(), name.bold(), declared)
                    }
                }
            }
        }
    }

    if !divergences.is_empty() {
        bail!("{} catalog divergence(s)", divergences.len());
    }
    Ok(())
}
