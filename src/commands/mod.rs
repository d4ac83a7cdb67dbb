pub mod agent;
pub mod backup;
pub mod catalog;
pub mod completions;

use eyre::{Context, Result};
use std::future::Future;

use quiver::AgentRegistry;
use quiver::config::Config;

/// Drive one registry future to completion
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    Ok(rt.block_on(future))
}

pub fn registry(config: &Config) -> Result<AgentRegistry> {
    AgentRegistry::from_config(config).context("Failed to open agent registry")
}
