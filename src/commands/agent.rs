//! Agent registry commands

use colored::*;
use eyre::{Result, bail};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

use quiver::agent::validator::ValidationResult;
use quiver::config::Config;
use quiver::lifecycle::{InstallOutcome, UninstallOutcome, UpdateOutcome};
use quiver::registry::search::SearchOptions;
use quiver::{Agent, Category, InstallFilter, InstallOptions, ListFilter, Tier, UpdateOptions};

use super::{block_on, registry};
use crate::cli::OutputFormat;

fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Text => return Ok(false),
    }
    Ok(true)
}

fn state_marker(agent: &Agent) -> ColoredString {
    if agent.available_update.is_some() {
        "↑".yellow()
    } else if agent.installed {
        "●".green()
    } else {
        "○".dimmed()
    }
}

fn print_agent_line(agent: &Agent) {
    let mut line = format!("  {} {} {}", state_marker(agent), agent.name.bold(), agent.version.dimmed());
    if let Some(ref update) = agent.available_update {
        line.push_str(&format!(" {}", format!("(update: {})", update).yellow()));
    }
    println!("{}", line);
    println!("    {}", agent.description.dimmed());
}

pub fn list(
    category: Option<Category>,
    installed: bool,
    available: bool,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let registry = registry(config)?;
    let filter = ListFilter {
        category,
        state: if installed {
            InstallFilter::Installed
        } else if available {
            InstallFilter::Available
        } else {
            InstallFilter::All
        },
    };
    let agents = block_on(registry.list_agents(&filter))?;

    if print_structured(&agents, format)? {
        return Ok(());
    }

    println!("{}", "Agents:".bold());
    println!();

    if agents.is_empty() {
        println!("  {} No agents found", "(none)".dimmed());
        println!("  Bundled agents are read from: {}", registry.roots().bundled.display());
        return Ok(());
    }

    let mut current: Option<Category> = None;
    for agent in &agents {
        if current != Some(agent.category) {
            if current.is_some() {
                println!();
            }
            println!("{}", agent.category.to_string().cyan().bold());
            current = Some(agent.category);
        }
        print_agent_line(agent);
    }

    println!();
    let installed_count = agents.iter().filter(|a| a.installed).count();
    println!("{} agents, {} installed", agents.len(), installed_count);
    Ok(())
}

pub fn show(name: &str, format: OutputFormat, config: &Config) -> Result<()> {
    let registry = registry(config)?;
    let Some(agent) = block_on(registry.get_agent(name))? else {
        bail!("Agent '{}' not found", name);
    };

    if print_structured(&agent, format)? {
        return Ok(());
    }

    println!("{} {}", "Agent:".bold(), agent.name.green().bold());
    println!();
    println!("{} {}", "Description:".bold(), agent.description);
    println!("{} {}", "Category:".bold(), agent.category.to_string().cyan());
    println!("{} {}", "Version:".bold(), agent.version);
    println!("{} {}", "Author:".bold(), agent.author);
    println!("{} {}", "License:".bold(), agent.license);
    println!("{} {} ({})", "Source:".bold(), agent.tier, agent.path.display());

    match agent.installed_version {
        Some(ref v) => println!("{} {}", "Installed:".bold(), v.green()),
        None => println!("{} {}", "Installed:".bold(), "no".dimmed()),
    }
    if let Some(ref update) = agent.available_update {
        println!("{} {}", "Update available:".bold(), update.yellow());
    }

    for (label, values) in [
        ("Tools:", &agent.tools),
        ("Tags:", &agent.tags),
        ("Keywords:", &agent.keywords),
        ("Dependencies:", &agent.dependencies),
        ("Conflicts:", &agent.conflicts),
    ] {
        if !values.is_empty() {
            println!("{} {}", label.bold(), values.join(", "));
        }
    }

    if !agent.content.is_empty() {
        println!();
        for line in agent.content.lines() {
            println!("  {}", line);
        }
    }

    Ok(())
}

pub fn install(name: &str, local: bool, force: bool, format: OutputFormat, quiet: bool, config: &Config) -> Result<()> {
    let registry = registry(config)?;
    let opts = InstallOptions {
        target_tier: if local { Tier::Local } else { Tier::Global },
        force,
    };
    let outcome = block_on(registry.install_agent(name, opts))??;

    if print_structured(&outcome, format)? || quiet {
        return Ok(());
    }
    print_install(&outcome);
    Ok(())
}

fn print_install(outcome: &InstallOutcome) {
    let verb = if outcome.replaced { "Reinstalled" } else { "Installed" };
    println!(
        "{} {} {} {} ({})",
        "✓".green(),
        verb,
        outcome.name.bold(),
        outcome.version,
        outcome.tier
    );
    println!("  {}", outcome.path.display().to_string().dimmed());

    if let Some(ref snapshot) = outcome.backup {
        println!("  Backup: {}", snapshot.id.dimmed());
    }
    for dep in &outcome.missing_dependencies {
        println!("  {} Dependency '{}' is not installed", "⚠".yellow(), dep);
    }
    for integration in &outcome.integration_steps {
        println!("  {} Integration '{}' needs setup before use", "⚠".yellow(), integration);
    }
}

pub fn uninstall(name: &str, format: OutputFormat, quiet: bool, config: &Config) -> Result<()> {
    let registry = registry(config)?;
    let outcome = block_on(registry.uninstall_agent(name))??;

    if print_structured(&outcome, format)? || quiet {
        return Ok(());
    }
    print_uninstall(&outcome);
    Ok(())
}

fn print_uninstall(outcome: &UninstallOutcome) {
    println!("{} Uninstalled {} ({})", "✓".green(), outcome.name.bold(), outcome.tier);
    if let Some(ref snapshot) = outcome.backup {
        println!("  Backup: {}", snapshot.id.dimmed());
    }
    if let Some(ref version) = outcome.fallback_version {
        println!("  Still available: {}", version.cyan());
    }
}

pub fn update(name: &str, force: bool, format: OutputFormat, quiet: bool, config: &Config) -> Result<()> {
    let registry = registry(config)?;
    let outcome = block_on(registry.update_agent(name, UpdateOptions { force }))??;

    if print_structured(&outcome, format)? || quiet {
        return Ok(());
    }
    print_update(&outcome);
    Ok(())
}

fn print_update(outcome: &UpdateOutcome) {
    println!(
        "{} Updated {} {} → {} ({})",
        "✓".green(),
        outcome.name.bold(),
        outcome.from_version.dimmed(),
        outcome.to_version.green(),
        outcome.tier
    );
    if let Some(ref snapshot) = outcome.backup {
        println!("  Backup: {}", snapshot.id.dimmed());
    }
    for integration in &outcome.integration_steps {
        println!("  {} Integration '{}' needs setup before use", "⚠".yellow(), integration);
    }
}

pub fn search(
    query: &str,
    category: Option<Category>,
    tags: Vec<String>,
    limit: usize,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let registry = registry(config)?;
    let opts = SearchOptions {
        category,
        tags: tags.into_iter().collect::<BTreeSet<_>>(),
        limit,
    };
    let results = block_on(registry.search_agents(query, &opts))?;

    if print_structured(&results, format)? {
        return Ok(());
    }

    if results.is_empty() {
        println!("{} No agents match '{}'", "(none)".dimmed(), query);
        return Ok(());
    }

    println!("{} '{}':", "Results for".bold(), query);
    println!();
    for agent in &results {
        print_agent_line(agent);
    }
    Ok(())
}

pub fn validate(path: &Path, format: OutputFormat, verbose: bool, config: &Config) -> Result<()> {
    let registry = registry(config)?;
    let result: ValidationResult = block_on(registry.validate_agent(path))?;

    if !print_structured(&result, format)? {
        if result.valid {
            println!("{} {} is valid", "✓".green(), path.display());
        } else {
            println!("{} {} is invalid", "✗".red(), path.display());
        }
        for error in &result.errors {
            println!("  {} {}", "error:".red(), error);
        }
        for warning in &result.warnings {
            println!("  {} {}", "warning:".yellow(), warning);
        }
        if let Some(tier) = result.tier {
            println!("  {} {} tier", "in".dimmed(), tier);
        }
        if verbose {
            if let Some(ref record) = result.record {
                println!("  {} {} {}", record.name.bold(), record.version, record.category.to_string().cyan());
            }
        }
    }

    if !result.valid {
        bail!("{} failed validation", path.display());
    }
    Ok(())
}
