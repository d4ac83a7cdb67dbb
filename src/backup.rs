//! Pre-mutation directory snapshots
//!
//! Each snapshot is a gzip'd tarball of one directory tree. Snapshots are
//! recorded in `index.json` in creation order; only the most recent
//! `retention` snapshots are kept.

use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::BackupError;

/// Snapshots kept when not configured otherwise
pub const DEFAULT_RETENTION: usize = 5;

const INDEX_FILE: &str = "index.json";

/// A retained snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub archive: PathBuf,
    /// Directory the snapshot was taken of
    pub source: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BackupIndex {
    #[serde(default)]
    snapshots: Vec<Snapshot>,
}

/// Archive store with bounded retention
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
    retention: usize,
}

impl BackupStore {
    pub fn new(dir: PathBuf, retention: usize) -> Self {
        Self {
            dir,
            retention: retention.max(1),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot `source` and prune snapshots beyond retention
    pub async fn create(&self, source: &Path) -> Result<Snapshot, BackupError> {
        let metadata = tokio::fs::metadata(source).await?;
        if !metadata.is_dir() {
            return Err(BackupError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a directory", source.display()),
            )));
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let created_at = Utc::now();
        let label = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "root".to_string());
        let stamp = created_at.format("%Y%m%dT%H%M%S%6f");

        let mut id = format!("{}-{}", stamp, label);
        let mut suffix = 1;
        while tokio::fs::try_exists(self.archive_path(&id)).await? {
            suffix += 1;
            id = format!("{}-{}-{}", stamp, label, suffix);
        }

        let archive = self.archive_path(&id);
        let (src, dst) = (source.to_path_buf(), archive.clone());
        let written = tokio::task::spawn_blocking(move || write_archive(&src, &dst)).await?;
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&archive).await;
            return Err(e.into());
        }

        let snapshot = Snapshot {
            id,
            created_at,
            archive,
            source: source.to_path_buf(),
        };

        let mut index = self.read_index().await?;
        index.snapshots.push(snapshot.clone());
        self.prune(&mut index).await?;
        self.write_index(&index).await?;

        log::info!("Backed up {} to {}", source.display(), snapshot.archive.display());
        Ok(snapshot)
    }

    /// Retained snapshots, oldest first
    pub async fn list(&self) -> Result<Vec<Snapshot>, BackupError> {
        Ok(self.read_index().await?.snapshots)
    }

    /// Replace the snapshot's source directory with the archived tree
    pub async fn restore(&self, id: &str) -> Result<Snapshot, BackupError> {
        let snapshot = self
            .list()
            .await?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| BackupError::NotFound(id.to_string()))?;

        if !tokio::fs::try_exists(&snapshot.archive).await? {
            return Err(BackupError::NotFound(snapshot.archive.display().to_string()));
        }

        if tokio::fs::try_exists(&snapshot.source).await? {
            tokio::fs::remove_dir_all(&snapshot.source).await?;
        }
        tokio::fs::create_dir_all(&snapshot.source).await?;

        let (src, dst) = (snapshot.archive.clone(), snapshot.source.clone());
        tokio::task::spawn_blocking(move || unpack_archive(&src, &dst)).await??;

        log::info!("Restored {} from {}", snapshot.source.display(), snapshot.id);
        Ok(snapshot)
    }

    fn archive_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.tar.gz", id))
    }

    async fn prune(&self, index: &mut BackupIndex) -> Result<(), BackupError> {
        while index.snapshots.len() > self.retention {
            let oldest = index.snapshots.remove(0);
            match tokio::fs::remove_file(&oldest.archive).await {
                Ok(()) => log::debug!("Pruned backup {}", oldest.id),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn read_index(&self) -> Result<BackupIndex, BackupError> {
        let path = self.dir.join(INDEX_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BackupIndex::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_index(&self, index: &BackupIndex) -> Result<(), BackupError> {
        let content = serde_json::to_string_pretty(index)?;
        tokio::fs::write(self.dir.join(INDEX_FILE), content).await?;
        Ok(())
    }
}

fn write_archive(source: &Path, archive: &Path) -> std::io::Result<()> {
    let file = std::fs::File::create(archive)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(".", source)?;
    builder.into_inner()?.finish()?;
    Ok(())
}

fn unpack_archive(archive: &Path, dest: &Path) -> std::io::Result<()> {
    let file = std::fs::File::open(archive)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive.unpack(dest)
}
