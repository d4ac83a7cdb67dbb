use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::agent::TierRoots;
use crate::backup::DEFAULT_RETENTION;

/// Main quiver configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub backup: BackupConfig,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Agents shipped with the system (read-only)
    pub bundled: PathBuf,
    /// User-wide install location
    pub global: PathBuf,
    /// Project-relative install location
    pub local: PathBuf,
    pub backups: PathBuf,
    /// Integration state file written by the integration bootstrap
    pub integrations: PathBuf,
    /// Custom category catalog; the built-in one is used when unset
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Snapshot the destination directory before install/uninstall/update
    pub enabled: bool,
    /// Number of snapshots kept
    pub retention: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let quiver_dir = Config::quiver_dir();
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("quiver");

        Self {
            bundled: data_dir.join("agents"),
            global: quiver_dir.join("agents"),
            local: PathBuf::from(".quiver").join("agents"),
            backups: quiver_dir.join("backups"),
            integrations: PathBuf::from(".quiver").join("agents").join("integrations.json"),
            catalog: None,
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retention: DEFAULT_RETENTION,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Check QUIVER_CONFIG env var
        if let Ok(env_path) = std::env::var("QUIVER_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from QUIVER_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try QUIVER_DIR/quiver.yaml, then ~/.config/quiver/quiver.yaml
        let mut candidates = vec![Self::quiver_dir().join("quiver.yaml")];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("quiver").join("quiver.yaml"));
        }
        candidates.dedup();

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }

        // Try ./quiver.yaml (for development)
        let local_config = PathBuf::from("quiver.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Get the quiver directory (global agents, backups, config)
    pub fn quiver_dir() -> PathBuf {
        std::env::var("QUIVER_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("quiver"))
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }

    /// Expanded tier roots
    pub fn tier_roots(&self) -> TierRoots {
        TierRoots::new(
            Self::expand_path(&self.paths.bundled),
            Self::expand_path(&self.paths.global),
            Self::expand_path(&self.paths.local),
        )
    }
}
