//! Category catalog for browsing
//!
//! The catalog lists each category with a description and the agents
//! expected in it. It is maintained separately from the agents themselves,
//! so the two can drift. An agent's own `category` field always decides
//! where it resolves; the catalog is only reported against, never applied.

use eyre::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::agent::{Agent, Category};

/// One catalog category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub description: String,

    /// Agent names expected in this category
    #[serde(default)]
    pub agents: Vec<String>,
}

/// Ordered category catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCatalog {
    pub categories: IndexMap<Category, CategoryEntry>,
}

/// A disagreement between the catalog and the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Divergence {
    /// Listed in the catalog, absent from the registry
    Missing { name: String, category: Category },
    /// Listed under one category, declares another
    Miscategorized {
        name: String,
        catalog: Category,
        declared: Category,
    },
    /// Present in the registry, listed nowhere in the catalog
    Unlisted { name: String, declared: Category },
}

const BUILTIN: &[(Category, &str, &[&str])] = &[
    (
        Category::Development,
        "Language, framework, and application development specialists",
        &["frontend-developer", "backend-architect", "react-expert", "typescript-pro", "python-pro"],
    ),
    (
        Category::DataAi,
        "Data engineering, analytics, and machine learning",
        &["data-engineer", "data-scientist", "ml-engineer", "prompt-engineer"],
    ),
    (
        Category::Infrastructure,
        "Cloud, deployment, and operations",
        &["cloud-architect", "devops-engineer", "kubernetes-expert", "incident-responder"],
    ),
    (
        Category::Security,
        "Security review, auditing, and hardening",
        &["security-auditor", "penetration-tester"],
    ),
    (
        Category::QualityTesting,
        "Code review, testing, and debugging",
        &["code-reviewer", "test-automator", "debugger", "performance-engineer"],
    ),
    (
        Category::Documentation,
        "Technical writing and API documentation",
        &["api-documenter", "technical-writer"],
    ),
    (
        Category::Business,
        "Product, analysis, and business operations",
        &["business-analyst", "product-manager"],
    ),
    (
        Category::Specialized,
        "Domain-specific and niche specialists",
        &["blockchain-developer", "game-developer"],
    ),
];

impl CategoryCatalog {
    /// The catalog shipped with the system
    pub fn builtin() -> Self {
        let categories = BUILTIN
            .iter()
            .map(|(category, description, agents)| {
                (
                    *category,
                    CategoryEntry {
                        description: description.to_string(),
                        agents: agents.iter().map(|a| a.to_string()).collect(),
                    },
                )
            })
            .collect();
        Self { categories }
    }

    /// Load a catalog from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read category catalog: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse a catalog from a YAML string
    pub fn from_str(content: &str) -> Result<Self> {
        let catalog: Self = serde_yaml::from_str(content).context("Failed to parse category catalog")?;
        Ok(catalog)
    }

    pub fn get(&self, category: Category) -> Option<&CategoryEntry> {
        self.categories.get(&category)
    }

    /// Catalog category listing `name`, if any
    pub fn category_of(&self, name: &str) -> Option<Category> {
        self.categories
            .iter()
            .find(|(_, entry)| entry.agents.iter().any(|a| a == name))
            .map(|(category, _)| *category)
    }

    /// Compare the catalog against resolved agents
    pub fn divergences(&self, agents: &[Agent]) -> Vec<Divergence> {
        let declared: HashMap<&str, Category> = agents.iter().map(|a| (a.name.as_str(), a.category)).collect();
        let mut found = Vec::new();

        for (category, entry) in &self.categories {
            for name in &entry.agents {
                match declared.get(name.as_str()) {
                    None => found.push(Divergence::Missing {
                        name: name.clone(),
                        category: *category,
                    }),
                    Some(own) if own != category => found.push(Divergence::Miscategorized {
                        name: name.clone(),
                        catalog: *category,
                        declared: *own,
                    }),
                    Some(_) => {}
                }
            }
        }

        for agent in agents {
            if self.category_of(&agent.name).is_none() {
                found.push(Divergence::Unlisted {
                    name: agent.name.clone(),
                    declared: agent.category,
                });
            }
        }

        found
    }
}
