//! Agent registry
//!
//! This module handles:
//! - Scanning the bundled, global, and local tiers
//! - Resolving them into one record per name
//! - Listing, lookup, and search over the resolved view
//! - Delegating mutations to [`crate::lifecycle`]
//!
//! Nothing is cached: every call re-scans the tiers.

use std::path::{Path, PathBuf};

use crate::agent::validator::{ValidationResult, validate_file};
use crate::agent::{Agent, Category, Tier, TierRoots};
use crate::backup::{BackupStore, Snapshot};
use crate::catalog::{CategoryCatalog, Divergence};
use crate::config::Config;
use crate::error::{BackupError, Result};
use crate::lifecycle::{InstallOptions, InstallOutcome, Lifecycle, UninstallOutcome, UpdateOptions, UpdateOutcome};

pub mod loader;
pub mod resolver;
pub mod search;

use resolver::TierScan;
use search::SearchOptions;

/// Which agents [`AgentRegistry::list_agents`] returns by install state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InstallFilter {
    #[default]
    All,
    /// Installed in the global or local tier
    Installed,
    /// Bundled only, available for install
    Available,
}

/// Post-resolution filter for listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub category: Option<Category>,
    pub state: InstallFilter,
}

impl ListFilter {
    pub fn installed() -> Self {
        Self {
            state: InstallFilter::Installed,
            ..Default::default()
        }
    }

    pub fn matches(&self, agent: &Agent) -> bool {
        let category_ok = self.category.map(|c| agent.category == c).unwrap_or(true);
        let state_ok = match self.state {
            InstallFilter::All => true,
            InstallFilter::Installed => agent.installed,
            InstallFilter::Available => !agent.installed,
        };
        category_ok && state_ok
    }
}

/// Scan all three tiers, one after another
pub async fn scan_tiers(roots: &TierRoots) -> TierScan {
    TierScan {
        bundled: loader::load_tier(Tier::Bundled, roots.root(Tier::Bundled)).await,
        global: loader::load_tier(Tier::Global, roots.root(Tier::Global)).await,
        local: loader::load_tier(Tier::Local, roots.root(Tier::Local)).await,
    }
}

/// Entry point for all registry operations
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    roots: TierRoots,
    backups: BackupStore,
    lifecycle: Lifecycle,
    catalog: CategoryCatalog,
}

impl AgentRegistry {
    pub fn new(
        roots: TierRoots,
        backups: BackupStore,
        backup_enabled: bool,
        integration_state: PathBuf,
        catalog: CategoryCatalog,
    ) -> Self {
        let lifecycle = Lifecycle::new(roots.clone(), backups.clone(), backup_enabled, integration_state);
        Self {
            roots,
            backups,
            lifecycle,
            catalog,
        }
    }

    /// Build a registry from loaded configuration
    pub fn from_config(config: &Config) -> eyre::Result<Self> {
        let catalog = match config.paths.catalog {
            Some(ref path) => CategoryCatalog::load(&Config::expand_path(path))?,
            None => CategoryCatalog::builtin(),
        };

        Ok(Self::new(
            config.tier_roots(),
            BackupStore::new(Config::expand_path(&config.paths.backups), config.backup.retention),
            config.backup.enabled,
            Config::expand_path(&config.paths.integrations),
            catalog,
        ))
    }

    pub fn roots(&self) -> &TierRoots {
        &self.roots
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    /// Raw per-tier records
    pub async fn scan(&self) -> TierScan {
        scan_tiers(&self.roots).await
    }

    /// Resolved agents matching `filter`, in registry order
    pub async fn list_agents(&self, filter: &ListFilter) -> Vec<Agent> {
        self.scan()
            .await
            .resolve()
            .into_iter()
            .filter(|a| filter.matches(a))
            .collect()
    }

    pub async fn get_agent(&self, name: &str) -> Option<Agent> {
        self.scan().await.resolve().into_iter().find(|a| a.name == name)
    }

    pub async fn install_agent(&self, name: &str, opts: InstallOptions) -> Result<InstallOutcome> {
        self.lifecycle.install(name, opts).await
    }

    pub async fn uninstall_agent(&self, name: &str) -> Result<UninstallOutcome> {
        self.lifecycle.uninstall(name).await
    }

    pub async fn update_agent(&self, name: &str, opts: UpdateOptions) -> Result<UpdateOutcome> {
        self.lifecycle.update(name, opts).await
    }

    pub async fn search_agents(&self, query: &str, opts: &SearchOptions) -> Vec<Agent> {
        let agents = self.scan().await.resolve();
        search::search(&agents, query, opts).into_iter().cloned().collect()
    }

    /// Validate a file, attributing it to the tier whose root holds it
    pub async fn validate_agent(&self, path: &Path) -> ValidationResult {
        let result = validate_file(path).await;
        match self.roots.tier_of(path) {
            Some(tier) => result.placed_in(tier),
            None => result,
        }
    }

    pub async fn list_backups(&self) -> std::result::Result<Vec<Snapshot>, BackupError> {
        self.backups.list().await
    }

    pub async fn restore_backup(&self, id: &str) -> std::result::Result<Snapshot, BackupError> {
        self.backups.restore(id).await
    }

    /// Where the category catalog and agents' own categories disagree
    pub async fn catalog_divergences(&self) -> Vec<Divergence> {
        let agents = self.scan().await.resolve();
        self.catalog.divergences(&agents)
    }
}
