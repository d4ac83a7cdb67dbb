//! Agent definitions and the storage tiers they live in
//!
//! An agent is a markdown file with YAML frontmatter:
//! - Frontmatter carries identity and metadata (name, category, version, ...)
//! - The body is opaque prompt content
//!
//! The same agent may exist in several tiers at once. Resolution picks one
//! record per name (see [`crate::registry::resolver`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub mod parser;
pub mod validator;

/// A storage tier, ordered by precedence (lowest first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Shipped with the system, read-only
    Bundled,
    /// User-wide install location
    Global,
    /// Project-relative install location
    Local,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Bundled, Tier::Global, Tier::Local];

    /// Whether agents can be installed into this tier
    pub fn is_writable(&self) -> bool {
        !matches!(self, Tier::Bundled)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Bundled => "bundled",
            Tier::Global => "global",
            Tier::Local => "local",
        };
        write!(f, "{}", s)
    }
}

/// The fixed set of agent categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Development,
    DataAi,
    Infrastructure,
    Security,
    QualityTesting,
    Documentation,
    Business,
    Specialized,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Development,
        Category::DataAi,
        Category::Infrastructure,
        Category::Security,
        Category::QualityTesting,
        Category::Documentation,
        Category::Business,
        Category::Specialized,
    ];

    /// Directory name and metadata spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Development => "development",
            Category::DataAi => "data-ai",
            Category::Infrastructure => "infrastructure",
            Category::Security => "security",
            Category::QualityTesting => "quality-testing",
            Category::Documentation => "documentation",
            Category::Business => "business",
            Category::Specialized => "specialized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// A single agent record as seen from one tier, or as resolved across tiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Unique name (e.g., "code-reviewer")
    pub name: String,

    pub category: Category,

    pub description: String,

    /// Semantic version text
    pub version: String,

    pub author: String,

    pub license: String,

    /// Declared capability identifiers, in order
    #[serde(default)]
    pub tools: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub keywords: Vec<String>,

    /// Agents this one requires
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Agents that may not be installed alongside this one
    #[serde(default)]
    pub conflicts: Vec<String>,

    /// Markdown body after the frontmatter
    #[serde(default)]
    pub content: String,

    /// File that produced this view
    pub path: PathBuf,

    /// Tier that produced this view
    pub tier: Tier,

    #[serde(default)]
    pub installed: bool,

    #[serde(default)]
    pub installed_version: Option<String>,

    /// Newer version held by a lower-precedence tier
    #[serde(default)]
    pub available_update: Option<String>,

    /// Full file text, copied verbatim on install
    #[serde(skip)]
    pub source_text: String,
}

impl Agent {
    /// Attach the tier and file this record was read from.
    ///
    /// Validation works on bare file contents, so placement is filled in by
    /// the loader afterwards.
    pub fn placed(mut self, tier: Tier, path: &Path) -> Self {
        self.tier = tier;
        self.path = path.to_path_buf();
        self
    }

    /// Parsed version; records that passed validation always have one
    pub fn semver(&self) -> Option<semver::Version> {
        semver::Version::parse(&self.version).ok()
    }

    /// Relative install location: `<category>/<name>.md`
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.category.as_str()).join(format!("{}.md", self.name))
    }
}

/// Root directories of the three tiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRoots {
    pub bundled: PathBuf,
    pub global: PathBuf,
    pub local: PathBuf,
}

impl TierRoots {
    pub fn new(bundled: PathBuf, global: PathBuf, local: PathBuf) -> Self {
        Self { bundled, global, local }
    }

    /// Root directory of a tier
    pub fn root(&self, tier: Tier) -> &Path {
        match tier {
            Tier::Bundled => &self.bundled,
            Tier::Global => &self.global,
            Tier::Local => &self.local,
        }
    }

    /// Tier whose root contains `path`; the deepest root wins when roots nest
    pub fn tier_of(&self, path: &Path) -> Option<Tier> {
        Tier::ALL
            .into_iter()
            .filter(|tier| path.starts_with(self.root(*tier)))
            .max_by_key(|tier| self.root(*tier).components().count())
    }
}
