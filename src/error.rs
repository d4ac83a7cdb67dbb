//! Error types for registry mutations
//!
//! Scanning and validation never fail; these cover lifecycle operations and
//! the backup store.

use std::path::PathBuf;
use thiserror::Error;

use crate::agent::Tier;

/// Lifecycle operation failures callers are expected to branch on
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Agent not found: {name}")]
    NotFound { name: String },

    #[error("Agent '{name}' is already installed ({tier} tier); use force to reinstall")]
    AlreadyInstalled { name: String, tier: Tier },

    #[error("Agent '{name}' conflicts with installed agent(s): {}", .installed.join(", "))]
    Conflict { name: String, installed: Vec<String> },

    #[error("Agent '{name}' is required by installed agent(s): {}", .dependents.join(", "))]
    DependencyViolation { name: String, dependents: Vec<String> },

    #[error("No update available for agent '{name}'")]
    NoUpdateAvailable { name: String },

    #[error("Agent '{name}' is already up to date (v{installed})")]
    AlreadyUpToDate { name: String, installed: String },

    #[error("Cannot write to the {tier} tier")]
    ReadOnlyTier { tier: Tier },

    #[error("Agent '{name}' is locked in the {tier} tier by another operation ({})", .lock_path.display())]
    Locked { name: String, tier: Tier, lock_path: PathBuf },

    #[error("Backup failed before modifying {}: {source}", .target.display())]
    BackupFailed {
        target: PathBuf,
        #[source]
        source: BackupError,
    },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LifecycleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LifecycleError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Backup store failures
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Backup not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backup index error: {0}")]
    Index(#[from] serde_json::Error),

    #[error("Backup task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, LifecycleError>;
