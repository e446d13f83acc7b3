use super::{require_backup_dir, DEFAULT_CONFIG_DIR, DEFAULT_DATA_DIR, DEFAULT_ENDPOINT};
use crate::{cli::Invocation, cli::Outcome, engine::BackupEngine, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Saves an etcd database snapshot and its backup metadata to a given directory
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "cluster-backup")]
pub struct BackupOptions {
    /// etcd endpoints
    #[arg(long, value_delimiter = ',', default_value = DEFAULT_ENDPOINT)]
    pub endpoints: Vec<String>,

    /// Path to the kubernetes config directory
    #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Path to the data directory
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Path to the directory where the backup is generated
    #[arg(long)]
    pub backup_dir: Option<PathBuf>,

    /// Identify secure client using this TLS certificate file
    #[arg(long, env = "ETCDCTL_CERT")]
    pub cert: Option<PathBuf>,

    /// Identify secure client using this TLS key file
    #[arg(long, env = "ETCDCTL_KEY")]
    pub key: Option<PathBuf>,

    /// Verify certificates of TLS-enabled secure servers using this CA bundle
    #[arg(long, env = "ETCDCTL_CACERT")]
    pub cacert: Option<PathBuf>,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            endpoints: vec![DEFAULT_ENDPOINT.to_string()],
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            backup_dir: None,
            cert: None,
            key: None,
            cacert: None,
        }
    }
}

impl BackupOptions {
    pub fn validate(&self) -> Result<()> {
        require_backup_dir(self.backup_dir.as_ref()).map(|_| ())
    }

    /// The validated backup directory.
    pub fn backup_dir(&self) -> Result<&Path> {
        require_backup_dir(self.backup_dir.as_ref())
    }

    pub async fn run<E: BackupEngine>(&self, engine: &E) -> Result<()> {
        tracing::info!(
            endpoints = ?self.endpoints,
            backup_dir = ?self.backup_dir,
            "Starting cluster backup"
        );

        if let Err(err) = engine.backup(self).await {
            tracing::error!("run: backup failed: {:#}", err);
            return Err(err.into());
        }

        Ok(())
    }
}

/// Validate and run a backup under the invocation's failure policy.
pub async fn execute<E: BackupEngine>(
    options: &BackupOptions,
    engine: &E,
    invocation: Invocation,
) -> Outcome {
    invocation
        .invoke(|| options.validate(), || options.run(engine))
        .await
}
