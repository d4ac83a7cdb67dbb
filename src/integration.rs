//! Per-project integration state
//!
//! Optional external integrations record their status in a JSON file owned
//! by the integration bootstrap. This module only reads it, to decide
//! whether an integration still needs setup after an agent is installed.
//!
//! ```json
//! {
//!   "serena": { "enabled": true, "initialized": false, "indexedAt": null }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::agent::Agent;

/// Status of one integration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationStatus {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub initialized: bool,
    #[serde(default)]
    pub indexed_at: Option<DateTime<Utc>>,
}

/// All integrations known to a project, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegrationState {
    pub integrations: BTreeMap<String, IntegrationStatus>,
}

impl IntegrationState {
    /// Load the state file; missing or malformed files read as empty
    pub async fn load(path: &Path) -> Self {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to read integration state {}: {}", path.display(), e);
                }
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                log::warn!("Ignoring malformed integration state {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&IntegrationStatus> {
        self.integrations.get(name)
    }

    /// Enabled but not yet initialized
    pub fn needs_setup(&self, name: &str) -> bool {
        self.get(name).map(|s| s.enabled && !s.initialized).unwrap_or(false)
    }

    /// Integrations that need setup and are referenced by the agent's tools
    pub fn pending_for(&self, agent: &Agent) -> Vec<String> {
        self.integrations
            .keys()
            .filter(|name| self.needs_setup(name))
            .filter(|name| {
                let name = name.to_lowercase();
                agent.tools.iter().any(|t| t.to_lowercase().contains(&name))
            })
            .cloned()
            .collect()
    }
}
