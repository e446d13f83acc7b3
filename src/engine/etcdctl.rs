use super::metadata::{find_snapshot, snapshot_file_name, BackupMetadata};
use super::{BackupEngine, RestoreEngine};
use crate::{cli::BackupOptions, cli::RestoreOptions, context::ExecutionContext};
use anyhow::{Context, Result};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

const DEFAULT_PROGRAM: &str = "etcdctl";
const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Engine that drives `etcdctl snapshot save` and `etcdctl snapshot restore`
#[derive(Debug, Clone)]
pub struct EtcdctlEngine {
    program: PathBuf,
    grace_period: Duration,
}

impl EtcdctlEngine {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }

    /// Time a cancelled restore gets to exit after SIGTERM before it is killed.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Arguments for `etcdctl snapshot save`
    pub fn snapshot_save_args(options: &BackupOptions, snapshot: &Path) -> Vec<String> {
        let mut args = vec![format!("--endpoints={}", options.endpoints.join(","))];

        if let Some(cert) = &options.cert {
            args.push(format!("--cert={}", cert.display()));
        }
        if let Some(key) = &options.key {
            args.push(format!("--key={}", key.display()));
        }
        if let Some(cacert) = &options.cacert {
            args.push(format!("--cacert={}", cacert.display()));
        }

        args.extend([
            "snapshot".to_string(),
            "save".to_string(),
            snapshot.display().to_string(),
        ]);
        args
    }

    /// Arguments for `etcdctl snapshot restore`
    pub fn snapshot_restore_args(snapshot: &Path, data_dir: &Path) -> Vec<String> {
        vec![
            "snapshot".to_string(),
            "restore".to_string(),
            snapshot.display().to_string(),
            "--data-dir".to_string(),
            data_dir.display().to_string(),
        ]
    }

    async fn terminate(&self, child: &mut tokio::process::Child) {
        if let Some(pid) = child.id() {
            if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                tracing::warn!("Failed to send SIGTERM to etcdctl ({}): {}", pid, e);
            }
        }

        match tokio::time::timeout(self.grace_period, child.wait()).await {
            Ok(_) => {}
            Err(_) => {
                tracing::warn!(
                    "etcdctl did not exit within {:?}, killing it",
                    self.grace_period
                );
                if let Err(e) = child.kill().await {
                    tracing::warn!("Failed to kill etcdctl: {}", e);
                }
            }
        }
    }
}

impl Default for EtcdctlEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BackupEngine for EtcdctlEngine {
    async fn backup(&self, options: &BackupOptions) -> Result<()> {
        let backup_dir = options.backup_dir()?;

        fs::create_dir_all(backup_dir).with_context(|| {
            format!("Failed to create backup directory {}", backup_dir.display())
        })?;

        let taken_at = chrono::Utc::now();
        let file_name = snapshot_file_name(taken_at);
        let snapshot = backup_dir.join(&file_name);
        let args = Self::snapshot_save_args(options, &snapshot);

        tracing::info!("Saving etcd snapshot to {}", snapshot.display());
        tracing::debug!("Running {} {:?}", self.program.display(), args);

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .env("ETCDCTL_API", "3")
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "etcdctl snapshot save failed ({}): {}",
                output.status,
                stderr.trim()
            );
        }

        let metadata = BackupMetadata {
            snapshot: file_name,
            backup_timestamp: taken_at,
            endpoints: options.endpoints.clone(),
            config_dir: options.config_dir.clone(),
            data_dir: options.data_dir.clone(),
        };
        let metadata_file = metadata.save(backup_dir)?;

        tracing::info!(
            snapshot = %snapshot.display(),
            metadata = %metadata_file.display(),
            "Snapshot saved"
        );
        Ok(())
    }
}

impl RestoreEngine for EtcdctlEngine {
    async fn restore(&self, ctx: &ExecutionContext, options: &RestoreOptions) -> Result<()> {
        let backup_dir = options.backup_dir()?;
        let snapshot = find_snapshot(backup_dir)?;
        ensure_empty_dir(&options.data_dir)?;

        if ctx.is_cancelled() {
            anyhow::bail!("restore cancelled by interrupt");
        }

        let args = Self::snapshot_restore_args(&snapshot, &options.data_dir);
        tracing::info!(
            "Restoring etcd snapshot {} into {}",
            snapshot.display(),
            options.data_dir.display()
        );
        tracing::debug!(
            config_dir = %options.config_dir.display(),
            "Running {} {:?}",
            self.program.display(),
            args
        );

        let mut child = tokio::process::Command::new(&self.program)
            .args(&args)
            .env("ETCDCTL_API", "3")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to run {}", self.program.display()))?;

        let status = tokio::select! {
            status = child.wait() => Some(status),
            _ = ctx.cancelled() => None,
        };

        match status {
            Some(status) => {
                let status = status.context("Failed to wait for etcdctl")?;
                if !status.success() {
                    anyhow::bail!("etcdctl snapshot restore failed ({})", status);
                }
                Ok(())
            }
            None => {
                self.terminate(&mut child).await;
                tracing::warn!(
                    "Restore interrupted, {} may contain a partial restore",
                    options.data_dir.display()
                );
                anyhow::bail!("restore cancelled by interrupt")
            }
        }
    }
}

/// The restore target must be absent or empty.
fn ensure_empty_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }

    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read data directory {}", dir.display()))?;
    if entries.next().is_some() {
        anyhow::bail!(
            "Data directory {} is not empty. Move it aside before restoring",
            dir.display()
        );
    }

    Ok(())
}
