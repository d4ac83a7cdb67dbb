//! Agent file validation
//!
//! Validation is total: malformed input never produces an `Err`, only a
//! [`ValidationResult`] with `valid == false` and the reasons in `errors`.

use lazy_regex::regex_is_match;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::parser::{Document, parse_document};
use super::{Agent, Category, Tier};

/// Frontmatter keys every agent must declare, in check order
pub const REQUIRED_FIELDS: [&str; 6] = ["name", "category", "description", "version", "author", "license"];

/// Bodies shorter than this (after trimming) draw a warning
pub const MIN_CONTENT_LENGTH: usize = 100;

/// Outcome of validating one agent file
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Tier holding the file, when it lies under a known tier root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    /// Present only when `valid`
    #[serde(skip)]
    pub record: Option<Agent>,
}

impl ValidationResult {
    fn invalid(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
            warnings,
            tier: None,
            record: None,
        }
    }

    /// Attach the tier the file was found in
    pub fn placed_in(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self.record = self.record.map(|record| {
            let path = record.path.clone();
            record.placed(tier, &path)
        });
        self
    }
}

/// Validate the contents of an agent file.
///
/// The returned record has no placement yet; see [`Agent::placed`].
pub fn validate(contents: &str) -> ValidationResult {
    let doc = match parse_document(contents) {
        Ok(doc) => doc,
        Err(reason) => return ValidationResult::invalid(vec![reason], Vec::new()),
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for field in REQUIRED_FIELDS {
        if doc.scalar(field).is_none() {
            errors.push(format!("missing required field: {}", field));
        }
    }

    if let Some(v) = doc.scalar("version") {
        if let Err(e) = semver::Version::parse(&v) {
            errors.push(format!("invalid version '{}': {}", v, e));
        }
    }

    let category = match doc.scalar("category") {
        Some(raw) => match raw.parse::<Category>() {
            Ok(c) => Some(c),
            Err(_) => {
                errors.push(format!(
                    "invalid category '{}' (expected one of: {})",
                    raw,
                    Category::ALL.map(|c| c.as_str()).join(", ")
                ));
                None
            }
        },
        None => None,
    };

    let tools = doc.list("tools");
    if tools.is_empty() {
        warnings.push("no tools declared".to_string());
    }

    if doc.body.trim().len() < MIN_CONTENT_LENGTH {
        warnings.push(format!("content is shorter than {} characters", MIN_CONTENT_LENGTH));
    }

    // The name becomes a file and lock name, so it must be a single path segment
    if let Some(name) = doc.scalar("name") {
        if !regex_is_match!(r"^[a-z0-9]+(-[a-z0-9]+)*$", &name) {
            errors.push(format!("invalid name '{}' (expected kebab-case, e.g. code-reviewer)", name));
        }
    }

    if !errors.is_empty() {
        return ValidationResult::invalid(errors, warnings);
    }

    match build_record(&doc, contents, category, tools) {
        Some(record) => ValidationResult {
            valid: true,
            errors,
            warnings,
            tier: None,
            record: Some(record),
        },
        None => ValidationResult::invalid(vec!["incomplete metadata".to_string()], warnings),
    }
}

/// Read and validate an agent file; unreadable files are reported as errors.
///
/// The record carries the file's path but no tier; see
/// [`ValidationResult::placed_in`].
pub async fn validate_file(path: &Path) -> ValidationResult {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => {
            let mut result = validate(&contents);
            if let Some(record) = result.record.as_mut() {
                record.path = path.to_path_buf();
            }
            result
        }
        Err(e) => ValidationResult::invalid(vec![format!("failed to read {}: {}", path.display(), e)], Vec::new()),
    }
}

fn build_record(doc: &Document, contents: &str, category: Option<Category>, tools: Vec<String>) -> Option<Agent> {
    Some(Agent {
        name: doc.scalar("name")?,
        category: category?,
        description: doc.scalar("description")?,
        version: doc.scalar("version")?,
        author: doc.scalar("author")?,
        license: doc.scalar("license")?,
        tools,
        tags: doc.list("tags"),
        keywords: doc.list("keywords"),
        dependencies: doc.list("dependencies"),
        conflicts: doc.list("conflicts"),
        content: doc.body.clone(),
        path: PathBuf::new(),
        tier: Tier::Bundled,
        installed: false,
        installed_version: None,
        available_update: None,
        source_text: contents.to_string(),
    })
}
