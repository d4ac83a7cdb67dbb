//! Quiver: a tiered registry of agent definitions
//!
//! Agents are Markdown files with YAML frontmatter, stored in three tiers
//! (bundled, global, local). The registry resolves the tiers into one view
//! per agent name and installs, uninstalls, and updates copies in the
//! writable tiers.

pub mod agent;
pub mod backup;
pub mod catalog;
pub mod config;
pub mod error;
pub mod integration;
pub mod lifecycle;
pub mod registry;

pub use agent::{Agent, Category, Tier, TierRoots};
pub use error::{BackupError, LifecycleError};
pub use lifecycle::{InstallOptions, UpdateOptions};
pub use registry::search::SearchOptions;
pub use registry::{AgentRegistry, InstallFilter, ListFilter};
