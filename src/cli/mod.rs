// CLI module - command options, orchestration and failure policy
pub mod backup;
pub mod policy;
pub mod restore;


pub use backup::BackupOptions;
pub use policy::{FailurePolicy, Invocation, Outcome};
pub use restore::RestoreOptions;

pub const DEFAULT_ENDPOINT: &str = "127.0.0.1:2379";
pub const DEFAULT_CONFIG_DIR: &str = "/etc/kubernetes";
pub const DEFAULT_DATA_DIR: &str = "/var/lib/etcd";

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Shared check for the only required flag of both commands.
pub(crate) fn require_backup_dir(backup_dir: Option<&PathBuf>) -> Result<&Path> {
    match backup_dir {
        Some(dir) if !dir.as_os_str().is_empty() => Ok(dir.as_path()),
        _ => Err(Error::MissingParameter("backup-dir")),
    }
}
