//! Install, uninstall, and update
//!
//! Every operation follows the same sequence:
//! 1. Scan and resolve the tiers, check preconditions (no writes yet)
//! 2. Take the advisory lock for `(tier, name)`
//! 3. Re-scan under the lock and re-check
//! 4. Snapshot the destination directory when backups are enabled
//! 5. Perform exactly one file write or delete
//!
//! A failed snapshot aborts before the destination is touched.

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::agent::{Agent, Tier, TierRoots};
use crate::backup::{BackupStore, Snapshot};
use crate::error::{LifecycleError, Result};
use crate::integration::IntegrationState;
use crate::registry::resolver::TierScan;
use crate::registry::scan_tiers;

pub mod lock;

use lock::AgentLock;

/// Options for [`Lifecycle::install`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOptions {
    /// Tier to install into; must be writable
    pub target_tier: Tier,
    /// Reinstall over an existing copy
    pub force: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            target_tier: Tier::Global,
            force: false,
        }
    }
}

/// Options for [`Lifecycle::update`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Rewrite even when the offered version is not newer
    pub force: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallOutcome {
    pub name: String,
    pub version: String,
    pub tier: Tier,
    pub path: PathBuf,
    /// An existing file was overwritten
    pub replaced: bool,
    pub backup: Option<Snapshot>,
    /// Declared dependencies not currently installed
    pub missing_dependencies: Vec<String>,
    /// Integrations referenced by the agent that still need setup
    pub integration_steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UninstallOutcome {
    pub name: String,
    pub tier: Tier,
    pub path: PathBuf,
    pub backup: Option<Snapshot>,
    /// Version still visible from a lower tier, if any
    pub fallback_version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    pub name: String,
    pub from_version: String,
    pub to_version: String,
    pub tier: Tier,
    pub path: PathBuf,
    pub backup: Option<Snapshot>,
    pub integration_steps: Vec<String>,
}

/// Write plan produced by precondition checks
#[derive(Debug)]
struct WritePlan {
    source: Agent,
    dest: PathBuf,
    missing_dependencies: Vec<String>,
}

/// Lifecycle controller over a set of tier roots
#[derive(Debug, Clone)]
pub struct Lifecycle {
    roots: TierRoots,
    backups: BackupStore,
    backup_enabled: bool,
    integration_state: PathBuf,
}

impl Lifecycle {
    pub fn new(roots: TierRoots, backups: BackupStore, backup_enabled: bool, integration_state: PathBuf) -> Self {
        Self {
            roots,
            backups,
            backup_enabled,
            integration_state,
        }
    }

    /// Copy an agent into `opts.target_tier`
    pub async fn install(&self, name: &str, opts: InstallOptions) -> Result<InstallOutcome> {
        if !opts.target_tier.is_writable() {
            return Err(LifecycleError::ReadOnlyTier { tier: opts.target_tier });
        }

        let scan = scan_tiers(&self.roots).await;
        self.plan_install(&scan, name, opts)?;

        let _lock = AgentLock::acquire(opts.target_tier, self.roots.root(opts.target_tier), name).await?;
        let scan = scan_tiers(&self.roots).await;
        let plan = self.plan_install(&scan, name, opts)?;

        let backup = self.snapshot_parent(&plan.dest).await?;
        let replaced = exists(&plan.dest).await?;
        write_atomic(&plan.dest, plan.source.source_text.clone()).await?;

        log::info!(
            "Installed {} v{} into {} tier at {}",
            name,
            plan.source.version,
            opts.target_tier,
            plan.dest.display()
        );

        let integration_steps = self.integration_steps(&plan.source).await;
        Ok(InstallOutcome {
            name: name.to_string(),
            version: plan.source.version.clone(),
            tier: opts.target_tier,
            path: plan.dest,
            replaced,
            backup,
            missing_dependencies: plan.missing_dependencies,
            integration_steps,
        })
    }

    /// Delete the highest-precedence installed copy of an agent
    pub async fn uninstall(&self, name: &str) -> Result<UninstallOutcome> {
        let scan = scan_tiers(&self.roots).await;
        let target = plan_uninstall(&scan, name)?;

        let _lock = AgentLock::acquire(target.tier, self.roots.root(target.tier), name).await?;
        let scan = scan_tiers(&self.roots).await;
        let target = plan_uninstall(&scan, name)?;

        let backup = self.snapshot_parent(&target.path).await?;
        tokio::fs::remove_file(&target.path)
            .await
            .map_err(|e| LifecycleError::io(&target.path, e))?;

        let fallback_version = Tier::ALL
            .iter()
            .rev()
            .filter(|t| **t < target.tier)
            .find_map(|t| scan.find(*t, name))
            .map(|a| a.version.clone());

        log::info!("Uninstalled {} from {} tier ({})", name, target.tier, target.path.display());

        Ok(UninstallOutcome {
            name: name.to_string(),
            tier: target.tier,
            path: target.path,
            backup,
            fallback_version,
        })
    }

    /// Replace an installed agent with the newer copy from a lower tier
    pub async fn update(&self, name: &str, opts: UpdateOptions) -> Result<UpdateOutcome> {
        let scan = scan_tiers(&self.roots).await;
        let (installed, _) = plan_update(&scan, name, opts)?;

        let _lock = AgentLock::acquire(installed.tier, self.roots.root(installed.tier), name).await?;
        let scan = scan_tiers(&self.roots).await;
        let (installed, source) = plan_update(&scan, name, opts)?;

        let backup = self.snapshot_parent(&installed.path).await?;
        write_atomic(&installed.path, source.source_text.clone()).await?;

        log::info!(
            "Updated {} from v{} to v{} in {} tier",
            name,
            installed.version,
            source.version,
            installed.tier
        );

        let integration_steps = self.integration_steps(&source).await;
        Ok(UpdateOutcome {
            name: name.to_string(),
            from_version: installed.version.clone(),
            to_version: source.version.clone(),
            tier: installed.tier,
            path: installed.path.clone(),
            backup,
            integration_steps,
        })
    }

    fn plan_install(&self, scan: &TierScan, name: &str, opts: InstallOptions) -> Result<WritePlan> {
        let merged = scan.resolve();
        let record = merged
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| LifecycleError::NotFound { name: name.to_string() })?;

        if record.installed && !opts.force {
            return Err(LifecycleError::AlreadyInstalled {
                name: name.to_string(),
                tier: record.tier,
            });
        }

        let mut conflicting: Vec<String> = merged
            .iter()
            .filter(|a| a.installed && a.name != name)
            .filter(|a| record.conflicts.contains(&a.name) || a.conflicts.iter().any(|c| c == name))
            .map(|a| a.name.clone())
            .collect();
        if !conflicting.is_empty() {
            conflicting.dedup();
            return Err(LifecycleError::Conflict {
                name: name.to_string(),
                installed: conflicting,
            });
        }

        // The checks above ran against this exact copy; nothing else is written
        let source = record.clone();
        let dest = self.roots.root(opts.target_tier).join(source.relative_path());

        let missing_dependencies = record
            .dependencies
            .iter()
            .filter(|dep| !merged.iter().any(|a| a.installed && &a.name == *dep))
            .cloned()
            .collect();

        Ok(WritePlan {
            source,
            dest,
            missing_dependencies,
        })
    }

    async fn snapshot_parent(&self, dest: &Path) -> Result<Option<Snapshot>> {
        if !self.backup_enabled {
            return Ok(None);
        }

        let Some(dir) = dest.parent() else {
            return Ok(None);
        };
        // Nothing to protect yet
        if !exists(dir).await? {
            return Ok(None);
        }

        self.backups
            .create(dir)
            .await
            .map(Some)
            .map_err(|source| LifecycleError::BackupFailed {
                target: dest.to_path_buf(),
                source,
            })
    }

    async fn integration_steps(&self, agent: &Agent) -> Vec<String> {
        IntegrationState::load(&self.integration_state).await.pending_for(agent)
    }
}

fn plan_uninstall(scan: &TierScan, name: &str) -> Result<Agent> {
    let merged = scan.resolve();
    let record = merged
        .iter()
        .find(|a| a.name == name && a.installed)
        .ok_or_else(|| LifecycleError::NotFound { name: name.to_string() })?;

    let dependents: Vec<String> = merged
        .iter()
        .filter(|a| a.installed && a.name != name)
        .filter(|a| a.dependencies.iter().any(|d| d == name))
        .map(|a| a.name.clone())
        .collect();
    if !dependents.is_empty() {
        return Err(LifecycleError::DependencyViolation {
            name: name.to_string(),
            dependents,
        });
    }

    Ok(record.clone())
}

/// Installed record and the lower-tier copy to update it from
fn plan_update(scan: &TierScan, name: &str, opts: UpdateOptions) -> Result<(Agent, Agent)> {
    let merged = scan.resolve();
    let installed = merged
        .iter()
        .find(|a| a.name == name && a.installed)
        .ok_or_else(|| LifecycleError::NotFound { name: name.to_string() })?;

    let offered = installed
        .available_update
        .as_deref()
        .ok_or_else(|| LifecycleError::NoUpdateAvailable { name: name.to_string() })?;

    let current = installed.installed_version.as_deref().unwrap_or(&installed.version);
    let newer = match (semver::Version::parse(offered), semver::Version::parse(current)) {
        (Ok(offered), Ok(current)) => offered > current,
        _ => false,
    };
    if !newer && !opts.force {
        return Err(LifecycleError::AlreadyUpToDate {
            name: name.to_string(),
            installed: current.to_string(),
        });
    }

    let source = Tier::ALL
        .iter()
        .filter(|t| **t < installed.tier)
        .filter_map(|t| scan.find(*t, name))
        .find(|a| a.version == offered)
        .ok_or_else(|| LifecycleError::NoUpdateAvailable { name: name.to_string() })?;

    Ok((installed.clone(), source.clone()))
}

async fn exists(path: &Path) -> Result<bool> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| LifecycleError::io(path, e))
}

/// Write through a hidden temp file in the destination directory, then rename
async fn write_atomic(dest: &Path, contents: String) -> Result<()> {
    let parent = dest
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| LifecycleError::io(dest, std::io::Error::other("destination has no parent directory")))?;

    tokio::fs::create_dir_all(&parent)
        .await
        .map_err(|e| LifecycleError::io(&parent, e))?;

    let target = dest.to_path_buf();
    let written = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let mut tmp = tempfile::Builder::new()
            .prefix(".quiver-")
            .suffix(".tmp")
            .tempfile_in(&parent)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| LifecycleError::io(dest, std::io::Error::other(e)))?;

    written.map_err(|e| LifecycleError::io(dest, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::DEFAULT_RETENTION;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        roots: TierRoots,
        backups: PathBuf,
        state: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let roots = TierRoots::new(
                temp.path().join("bundled"),
                temp.path().join("global"),
                temp.path().join("project").join("agents"),
            );
            let backups = temp.path().join("backups");
            let state = temp.path().join("project").join("integrations.json");
            Self {
                _temp: temp,
                roots,
                backups,
                state,
            }
        }

        fn lifecycle(&self, backup_enabled: bool) -> Lifecycle {
            Lifecycle::new(
                self.roots.clone(),
                BackupStore::new(self.backups.clone(), DEFAULT_RETENTION),
                backup_enabled,
                self.state.clone(),
            )
        }

        fn write(&self, tier: Tier, name: &str, version: &str, extra: &str) -> PathBuf {
            let dir = self.roots.root(tier).join("development");
            fs::create_dir_all(&dir).unwrap();
            let path = dir.join(format!("{}.md", name));
            fs::write(
                &path,
                format!(
                    "---\nname: {name}\ncategory: development\ndescription: {name} helper\nversion: {version}\nauthor: Test\nlicense: MIT\ntools: Read\n{extra}---\n\nYou help with {name}.\n"
                ),
            )
            .unwrap();
            path
        }

        fn dest(&self, tier: Tier, name: &str) -> PathBuf {
            self.roots.root(tier).join("development").join(format!("{}.md", name))
        }
    }

    fn tree(root: &Path) -> Vec<PathBuf> {
        walkdir::WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .collect()
    }

    #[tokio::test]
    async fn test_install_copies_verbatim() {
        let fx = Fixture::new();
        let src = fx.write(Tier::Bundled, "helper", "1.0.0", "");

        let outcome = fx.lifecycle(false).install("helper", InstallOptions::default()).await.unwrap();

        assert_eq!(outcome.tier, Tier::Global);
        assert_eq!(outcome.path, fx.dest(Tier::Global, "helper"));
        assert!(!outcome.replaced);
        assert!(outcome.backup.is_none());
        assert_eq!(fs::read_to_string(&outcome.path).unwrap(), fs::read_to_string(src).unwrap());
    }

    #[tokio::test]
    async fn test_install_local_tier() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "helper", "1.0.0", "");

        let opts = InstallOptions {
            target_tier: Tier::Local,
            force: false,
        };
        let outcome = fx.lifecycle(false).install("helper", opts).await.unwrap();
        assert_eq!(outcome.path, fx.dest(Tier::Local, "helper"));
        assert!(outcome.path.exists());
    }

    #[tokio::test]
    async fn test_install_already_installed_writes_nothing() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "helper", "2.0.0", "");
        let installed = fx.write(Tier::Global, "helper", "1.0.0", "");
        let before_global = tree(&fx.roots.global);
        let before_content = fs::read_to_string(&installed).unwrap();

        let err = fx
            .lifecycle(true)
            .install("helper", InstallOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::AlreadyInstalled { tier: Tier::Global, .. }));
        assert_eq!(tree(&fx.roots.global), before_global);
        assert_eq!(fs::read_to_string(&installed).unwrap(), before_content);
        assert!(!fx.backups.exists());
    }

    #[tokio::test]
    async fn test_forced_reinstall_rewrites_resolved_copy() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "helper", "2.0.0", "");
        let installed = fx.write(Tier::Global, "helper", "1.0.0", "");
        let before = fs::read_to_string(&installed).unwrap();

        let opts = InstallOptions {
            target_tier: Tier::Global,
            force: true,
        };
        let outcome = fx.lifecycle(true).install("helper", opts).await.unwrap();

        assert!(outcome.replaced);
        assert_eq!(outcome.version, "1.0.0");
        assert_eq!(outcome.path, installed);
        let snapshot = outcome.backup.unwrap();
        assert_eq!(snapshot.source, fx.roots.global.join("development"));
        assert!(snapshot.archive.exists());
        assert_eq!(fs::read_to_string(&installed).unwrap(), before);
    }

    #[tokio::test]
    async fn test_forced_reinstall_never_writes_unchecked_lower_copy() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "helper", "1.0.0", "conflicts: [other]\n");
        let installed = fx.write(Tier::Global, "helper", "1.2.0", "");
        fx.write(Tier::Global, "other", "1.0.0", "");

        let opts = InstallOptions {
            target_tier: Tier::Global,
            force: true,
        };
        let outcome = fx.lifecycle(false).install("helper", opts).await.unwrap();

        assert_eq!(outcome.version, "1.2.0");
        let written = fs::read_to_string(&installed).unwrap();
        assert!(written.contains("version: 1.2.0"));
        assert!(!written.contains("conflicts"));
        assert!(fx.dest(Tier::Global, "other").exists());
    }

    #[tokio::test]
    async fn test_install_rejects_path_like_names() {
        let fx = Fixture::new();
        let dir = fx.roots.bundled.join("development");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("evil.md"),
            "---\nname: ../../outside\ncategory: development\ndescription: escapes\nversion: 1.0.0\nauthor: Test\nlicense: MIT\n---\n\nbody\n",
        )
        .unwrap();

        let err = fx
            .lifecycle(false)
            .install("../../outside", InstallOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::NotFound { .. }));
        assert!(!fx._temp.path().join("outside.md").exists());
        assert!(!fx.roots.global.exists());
    }

    #[tokio::test]
    async fn test_exists_reports_io_errors() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain");
        fs::write(&file, "x").unwrap();

        assert!(exists(&file).await.unwrap());
        assert!(!exists(&temp.path().join("missing")).await.unwrap());
        // A path through a regular file is an error, not "absent"
        let err = exists(&file.join("child")).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Io { .. }));
    }

    #[tokio::test]
    async fn test_install_not_found() {
        let fx = Fixture::new();
        let err = fx
            .lifecycle(false)
            .install("ghost", InstallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_install_bundled_tier_rejected() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "helper", "1.0.0", "");
        let opts = InstallOptions {
            target_tier: Tier::Bundled,
            force: true,
        };
        let err = fx.lifecycle(false).install("helper", opts).await.unwrap_err();
        assert!(matches!(err, LifecycleError::ReadOnlyTier { tier: Tier::Bundled }));
    }

    #[tokio::test]
    async fn test_install_conflict() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "react-expert", "1.0.0", "conflicts: [vue-expert]\n");
        fx.write(Tier::Global, "vue-expert", "1.0.0", "");

        let err = fx
            .lifecycle(false)
            .install("react-expert", InstallOptions::default())
            .await
            .unwrap_err();

        match err {
            LifecycleError::Conflict { installed, .. } => assert_eq!(installed, vec!["vue-expert"]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!fx.dest(Tier::Global, "react-expert").exists());
    }

    #[tokio::test]
    async fn test_install_conflict_declared_by_installed_agent() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "react-expert", "1.0.0", "");
        fx.write(Tier::Global, "vue-expert", "1.0.0", "conflicts: [react-expert]\n");

        let err = fx
            .lifecycle(false)
            .install("react-expert", InstallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_install_reports_missing_dependencies() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "app", "1.0.0", "dependencies: [db, cache]\n");
        fx.write(Tier::Global, "db", "1.0.0", "");

        let outcome = fx.lifecycle(false).install("app", InstallOptions::default()).await.unwrap();
        assert_eq!(outcome.missing_dependencies, vec!["cache"]);
    }

    #[tokio::test]
    async fn test_install_reports_integration_steps() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "navigator", "1.0.0", "");
        let path = fx.roots.bundled.join("development").join("navigator.md");
        let content = fs::read_to_string(&path).unwrap().replace("tools: Read", "tools: Read, mcp__serena__find_symbol");
        fs::write(&path, content).unwrap();
        fs::create_dir_all(fx.state.parent().unwrap()).unwrap();
        fs::write(&fx.state, r#"{"serena": {"enabled": true, "initialized": false}}"#).unwrap();

        let outcome = fx
            .lifecycle(false)
            .install("navigator", InstallOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome.integration_steps, vec!["serena"]);
    }

    #[tokio::test]
    async fn test_install_backup_failure_aborts_before_write() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "helper", "1.0.0", "");
        fs::create_dir_all(fx.roots.global.join("development")).unwrap();
        // A regular file where the backup directory should be
        fs::write(&fx.backups, "not a directory").unwrap();

        let err = fx
            .lifecycle(true)
            .install("helper", InstallOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LifecycleError::BackupFailed { .. }));
        assert!(!fx.dest(Tier::Global, "helper").exists());
    }

    #[tokio::test]
    async fn test_install_locked() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "helper", "1.0.0", "");
        let _held = AgentLock::acquire(Tier::Global, &fx.roots.global, "helper").await.unwrap();

        let err = fx
            .lifecycle(false)
            .install("helper", InstallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Locked { .. }));
        assert!(!fx.dest(Tier::Global, "helper").exists());
    }

    #[tokio::test]
    async fn test_uninstall_removes_file() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "helper", "1.0.0", "");
        let installed = fx.write(Tier::Global, "helper", "1.0.0", "");

        let outcome = fx.lifecycle(false).uninstall("helper").await.unwrap();
        assert_eq!(outcome.tier, Tier::Global);
        assert_eq!(outcome.fallback_version.as_deref(), Some("1.0.0"));
        assert!(!installed.exists());
    }

    #[tokio::test]
    async fn test_uninstall_without_fallback() {
        let fx = Fixture::new();
        let installed = fx.write(Tier::Local, "custom", "0.1.0", "");

        let outcome = fx.lifecycle(true).uninstall("custom").await.unwrap();
        assert!(outcome.fallback_version.is_none());
        assert!(outcome.backup.is_some());
        assert!(!installed.exists());
    }

    #[tokio::test]
    async fn test_uninstall_not_installed() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "helper", "1.0.0", "");
        let err = fx.lifecycle(false).uninstall("helper").await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_uninstall_dependency_violation_keeps_file() {
        let fx = Fixture::new();
        let db = fx.write(Tier::Global, "db", "1.0.0", "");
        fx.write(Tier::Local, "app", "1.0.0", "dependencies: [db]\n");

        let err = fx.lifecycle(true).uninstall("db").await.unwrap_err();
        match err {
            LifecycleError::DependencyViolation { dependents, .. } => assert_eq!(dependents, vec!["app"]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(db.exists());
        assert!(!fx.backups.exists());
    }

    #[tokio::test]
    async fn test_update_replaces_installed_copy() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "helper", "1.1.0", "");
        let installed = fx.write(Tier::Global, "helper", "1.0.0", "");

        let outcome = fx.lifecycle(true).update("helper", UpdateOptions::default()).await.unwrap();
        assert_eq!(outcome.from_version, "1.0.0");
        assert_eq!(outcome.to_version, "1.1.0");
        assert_eq!(outcome.path, installed);
        assert!(outcome.backup.is_some());
        assert!(fs::read_to_string(&installed).unwrap().contains("version: 1.1.0"));

        let err = fx.lifecycle(true).update("helper", UpdateOptions::default()).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NoUpdateAvailable { .. }));
    }

    #[tokio::test]
    async fn test_update_not_installed() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "helper", "1.0.0", "");
        let err = fx.lifecycle(false).update("helper", UpdateOptions::default()).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_no_update_available_even_when_forced() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "helper", "1.0.0", "");
        fx.write(Tier::Global, "helper", "1.2.0", "");

        let err = fx
            .lifecycle(false)
            .update("helper", UpdateOptions { force: true })
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NoUpdateAvailable { .. }));
    }

    #[tokio::test]
    async fn test_update_local_from_global() {
        let fx = Fixture::new();
        fx.write(Tier::Bundled, "helper", "1.5.0", "");
        fx.write(Tier::Global, "helper", "2.0.0", "");
        let local = fx.write(Tier::Local, "helper", "1.0.0", "");

        let outcome = fx.lifecycle(false).update("helper", UpdateOptions::default()).await.unwrap();
        assert_eq!(outcome.tier, Tier::Local);
        assert_eq!(outcome.to_version, "2.0.0");
        assert!(fs::read_to_string(local).unwrap().contains("version: 2.0.0"));
    }
}
