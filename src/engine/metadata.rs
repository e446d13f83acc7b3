use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const METADATA_FILE: &str = "backup-metadata.json";
pub const SNAPSHOT_PREFIX: &str = "snapshot_";
pub const SNAPSHOT_SUFFIX: &str = ".db";

/// Description of a backup, written next to the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub snapshot: String,
    pub backup_timestamp: DateTime<Utc>,
    pub endpoints: Vec<String>,
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl BackupMetadata {
    pub fn save(&self, backup_dir: &Path) -> Result<PathBuf> {
        let path = backup_dir.join(METADATA_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Load metadata from a backup directory, if present.
    pub fn load(backup_dir: &Path) -> Result<Option<Self>> {
        let path = backup_dir.join(METADATA_FILE);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let metadata = serde_json::from_str(&content)
            .with_context(|| format!("Invalid backup metadata in {}", path.display()))?;
        Ok(Some(metadata))
    }
}

/// Snapshot file name for a backup taken at `at`, e.g. `snapshot_2024-05-01_101500.db`
pub fn snapshot_file_name(at: DateTime<Utc>) -> String {
    format!(
        "{}{}{}",
        SNAPSHOT_PREFIX,
        at.format("%Y-%m-%d_%H%M%S"),
        SNAPSHOT_SUFFIX
    )
}

/// Find the snapshot to restore from.
///
/// Prefers the snapshot named in the metadata file and falls back to the
/// latest `snapshot_*.db` by name.
pub fn find_snapshot(backup_dir: &Path) -> Result<PathBuf> {
    if !backup_dir.is_dir() {
        anyhow::bail!("Backup directory not found: {}", backup_dir.display());
    }

    if let Some(metadata) = BackupMetadata::load(backup_dir)? {
        if !is_plain_file_name(&metadata.snapshot) {
            anyhow::bail!(
                "Invalid snapshot name {:?} in {}",
                metadata.snapshot,
                backup_dir.join(METADATA_FILE).display()
            );
        }
        let snapshot = backup_dir.join(&metadata.snapshot);
        if snapshot.is_file() {
            return Ok(snapshot);
        }
        tracing::warn!(
            "Snapshot {} listed in {} is missing, scanning backup directory",
            metadata.snapshot,
            METADATA_FILE
        );
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(backup_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(SNAPSHOT_PREFIX)
            && name.ends_with(SNAPSHOT_SUFFIX)
            && entry.path().is_file()
        {
            candidates.push(name);
        }
    }

    candidates.sort();
    match candidates.pop() {
        Some(name) => Ok(backup_dir.join(name)),
        None => anyhow::bail!("No etcd snapshot found in {}", backup_dir.display()),
    }
}

/// A single normal path component, so joining it stays inside the backup dir.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
