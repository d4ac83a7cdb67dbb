//! Tier scanning - discover agent files under a tier root
//!
//! Walks `<root>/<category>/<name>.md`, validates every candidate, and keeps
//! only the valid ones. Invalid files are logged and dropped.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::agent::validator::validate;
use crate::agent::{Agent, Tier};

/// Subtree holding shared documentation, never installable
pub const SHARED_DIR: &str = "shared";

/// Load every valid agent under a tier root.
///
/// A missing root yields an empty list.
pub async fn load_tier(tier: Tier, root: &Path) -> Vec<Agent> {
    let candidates = discover_candidates(root).await;
    let mut agents = Vec::with_capacity(candidates.len());

    for path in candidates {
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) => {
                log::debug!("Skipping unreadable agent file {}: {}", path.display(), e);
                continue;
            }
        };

        let result = validate(&contents);
        match result.record {
            Some(record) => agents.push(record.placed(tier, &path)),
            None => {
                log::debug!(
                    "Skipping invalid agent file {} ({} tier): {}",
                    path.display(),
                    tier,
                    result.errors.join("; ")
                );
            }
        }
    }

    log::debug!("Loaded {} agents from {} tier at {}", agents.len(), tier, root.display());
    agents
}

/// Find candidate agent files, sorted by path
async fn discover_candidates(root: &Path) -> Vec<PathBuf> {
    let root = root.to_path_buf();
    let walked = tokio::task::spawn_blocking(move || walk(&root)).await;

    match walked {
        Ok(paths) => paths,
        Err(e) => {
            log::warn!("Tier scan task failed: {}", e);
            Vec::new()
        }
    }
}

fn walk(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();

    if !root.exists() {
        return found;
    }

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(should_enter);

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::debug!("Error walking directory: {}", e);
                continue;
            }
        };

        if entry.file_type().is_file() && is_candidate(entry.path()) {
            found.push(entry.into_path());
        }
    }

    found
}

fn is_candidate(path: &Path) -> bool {
    let is_markdown = path.extension().map(|e| e == "md").unwrap_or(false);
    let is_readme = path
        .file_name()
        .map(|n| n.to_string_lossy().eq_ignore_ascii_case("README.md"))
        .unwrap_or(false);
    is_markdown && !is_readme
}

/// Check if we should enter a directory during scanning
fn should_enter(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }

    let name = entry.file_name().to_string_lossy();

    // Hidden entries include the lock directory
    if name.starts_with('.') {
        return false;
    }

    !(entry.file_type().is_dir() && name == SHARED_DIR)
}
