//! Three-tier resolution
//!
//! Merges per-tier record lists into one record per name. Later tiers
//! override earlier ones: local > global > bundled. A lower tier holding a
//! strictly newer version surfaces as `available_update`.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::agent::{Agent, Category, Tier};

/// Records loaded from each tier, before resolution
#[derive(Debug, Clone, Default)]
pub struct TierScan {
    pub bundled: Vec<Agent>,
    pub global: Vec<Agent>,
    pub local: Vec<Agent>,
}

impl TierScan {
    /// Records of one tier
    pub fn tier(&self, tier: Tier) -> &[Agent] {
        match tier {
            Tier::Bundled => &self.bundled,
            Tier::Global => &self.global,
            Tier::Local => &self.local,
        }
    }

    /// Copy of `name` held by `tier`, if any
    pub fn find(&self, tier: Tier, name: &str) -> Option<&Agent> {
        // Later entries win within a tier, matching resolution
        self.tier(tier).iter().rev().find(|a| a.name == name)
    }

    /// Resolve this scan into the merged registry
    pub fn resolve(&self) -> Vec<Agent> {
        resolve(&self.bundled, &self.global, &self.local)
    }
}

/// Merge three tiers into one record per name.
///
/// Output is ordered by category, then name.
pub fn resolve(bundled: &[Agent], global: &[Agent], local: &[Agent]) -> Vec<Agent> {
    let tiers: [(Tier, &[Agent]); 3] = [(Tier::Bundled, bundled), (Tier::Global, global), (Tier::Local, local)];

    let mut merged: IndexMap<String, Agent> = IndexMap::new();
    for (_, records) in &tiers {
        for record in records.iter() {
            merged.insert(record.name.clone(), record.clone());
        }
    }

    let by_tier: Vec<(Tier, HashMap<&str, &Agent>)> = tiers
        .iter()
        .map(|(tier, records)| (*tier, records.iter().map(|a| (a.name.as_str(), a)).collect()))
        .collect();

    let mut resolved: Vec<Agent> = merged
        .into_values()
        .map(|mut agent| {
            agent.installed = agent.tier.is_writable();
            agent.installed_version = agent.installed.then(|| agent.version.clone());
            agent.available_update = newer_in_lower_tiers(&agent, &by_tier);
            agent
        })
        .collect();

    resolved.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    resolved
}

fn sort_key(agent: &Agent) -> (Category, &str) {
    (agent.category, agent.name.as_str())
}

/// Greatest version strictly newer than `chosen` held by a lower tier
fn newer_in_lower_tiers(chosen: &Agent, by_tier: &[(Tier, HashMap<&str, &Agent>)]) -> Option<String> {
    let current = chosen.semver()?;

    by_tier
        .iter()
        .filter(|(tier, _)| *tier < chosen.tier)
        .filter_map(|(_, records)| records.get(chosen.name.as_str()))
        .filter_map(|a| a.semver().map(|v| (v, a.version.clone())))
        .filter(|(v, _)| *v > current)
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, text)| text)
}
