//! Advisory lock files keyed by tier and agent name
//!
//! A lock is a file at `<tier_root>/.locks/<name>.lock` created with
//! exclusive-create semantics and holding `<pid> <rfc3339 timestamp>`. It is
//! removed when the guard drops. A lock left behind by a crashed process is
//! taken over once it is older than [`STALE_AFTER_SECS`].

use chrono::{DateTime, Duration, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::agent::Tier;
use crate::error::{LifecycleError, Result};

const LOCK_DIR: &str = ".locks";

/// Age after which an existing lock is considered abandoned
pub const STALE_AFTER_SECS: i64 = 600;

/// Held advisory lock; released on drop
#[derive(Debug)]
pub struct AgentLock {
    path: PathBuf,
}

impl AgentLock {
    /// Acquire the lock for `(tier, name)` without waiting
    pub async fn acquire(tier: Tier, tier_root: &Path, name: &str) -> Result<Self> {
        let dir = tier_root.join(LOCK_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| LifecycleError::io(&dir, e))?;

        let path = dir.join(format!("{}.lock", name));
        let mut took_over = false;

        loop {
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            match opened {
                Ok(_) => break,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if took_over || !is_stale(&path).await {
                        return Err(LifecycleError::Locked {
                            name: name.to_string(),
                            tier,
                            lock_path: path,
                        });
                    }
                    log::warn!("Removing stale lock {}", path.display());
                    match tokio::fs::remove_file(&path).await {
                        Ok(()) => {}
                        Err(e) if e.kind() == ErrorKind::NotFound => {}
                        Err(e) => return Err(LifecycleError::io(&path, e)),
                    }
                    took_over = true;
                }
                Err(e) => return Err(LifecycleError::io(&path, e)),
            }
        }

        let owner = format!("{} {}\n", std::process::id(), Utc::now().to_rfc3339());
        if let Err(e) = tokio::fs::write(&path, owner).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(LifecycleError::io(&path, e));
        }

        log::debug!("Acquired lock {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Whether the lock is older than [`STALE_AFTER_SECS`].
///
/// Age comes from the recorded timestamp, or the file's mtime when none was
/// written. Unreadable files count as held.
async fn is_stale(path: &Path) -> bool {
    let Ok(content) = tokio::fs::read_to_string(path).await else {
        return false;
    };

    let recorded = content
        .split_whitespace()
        .nth(1)
        .and_then(|stamp| DateTime::parse_from_rfc3339(stamp).ok())
        .map(|created| created.with_timezone(&Utc));

    let created = match recorded {
        Some(created) => created,
        None => match tokio::fs::metadata(path).await.and_then(|m| m.modified()) {
            Ok(modified) => DateTime::<Utc>::from(modified),
            Err(_) => return false,
        },
    };

    Utc::now().signed_duration_since(created) > Duration::seconds(STALE_AFTER_SECS)
}

impl Drop for AgentLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
        // Only succeeds once no other lock remains
        if let Some(dir) = self.path.parent() {
            let _ = std::fs::remove_dir(dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_second_acquire_is_locked() {
        let temp = TempDir::new().unwrap();
        let first = AgentLock::acquire(Tier::Global, temp.path(), "react-expert").await.unwrap();
        assert!(first.path().exists());

        let err = AgentLock::acquire(Tier::Global, temp.path(), "react-expert").await.unwrap_err();
        assert!(matches!(err, LifecycleError::Locked { .. }));
    }

    #[tokio::test]
    async fn test_lock_released_on_drop() {
        let temp = TempDir::new().unwrap();
        let path = {
            let lock = AgentLock::acquire(Tier::Local, temp.path(), "a").await.unwrap();
            lock.path().to_path_buf()
        };
        assert!(!path.exists());
        AgentLock::acquire(Tier::Local, temp.path(), "a").await.unwrap();
    }

    fn plant_lock(root: &Path, name: &str, content: &str) -> PathBuf {
        let dir = root.join(LOCK_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}.lock", name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_lock_records_owner() {
        let temp = TempDir::new().unwrap();
        let lock = AgentLock::acquire(Tier::Global, temp.path(), "a").await.unwrap();
        let content = std::fs::read_to_string(lock.path()).unwrap();
        let mut parts = content.split_whitespace();
        assert_eq!(parts.next(), Some(std::process::id().to_string().as_str()));
        assert!(DateTime::parse_from_rfc3339(parts.next().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_stale_lock_is_taken_over() {
        let temp = TempDir::new().unwrap();
        let old = Utc::now() - Duration::seconds(STALE_AFTER_SECS + 60);
        let path = plant_lock(temp.path(), "a", &format!("999999 {}\n", old.to_rfc3339()));

        let lock = AgentLock::acquire(Tier::Global, temp.path(), "a").await.unwrap();
        assert_eq!(lock.path(), path);
        assert!(!std::fs::read_to_string(&path).unwrap().starts_with("999999"));
    }

    #[tokio::test]
    async fn test_fresh_or_unreadable_lock_is_held() {
        let temp = TempDir::new().unwrap();
        plant_lock(temp.path(), "fresh", &format!("999999 {}\n", Utc::now().to_rfc3339()));
        plant_lock(temp.path(), "empty", "");

        for name in ["fresh", "empty"] {
            let err = AgentLock::acquire(Tier::Global, temp.path(), name).await.unwrap_err();
            match err {
                LifecycleError::Locked { lock_path, .. } => {
                    assert_eq!(lock_path, temp.path().join(LOCK_DIR).join(format!("{}.lock", name)));
                    // The message names the file to remove by hand
                    let message = LifecycleError::Locked {
                        name: name.to_string(),
                        tier: Tier::Global,
                        lock_path: lock_path.clone(),
                    }
                    .to_string();
                    assert!(message.contains(&lock_path.display().to_string()));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[tokio::test]
    async fn test_locks_are_per_name() {
        let temp = TempDir::new().unwrap();
        let _a = AgentLock::acquire(Tier::Global, temp.path(), "a").await.unwrap();
        let _b = AgentLock::acquire(Tier::Global, temp.path(), "b").await.unwrap();
    }
}
