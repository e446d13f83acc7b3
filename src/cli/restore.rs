use super::{require_backup_dir, DEFAULT_CONFIG_DIR, DEFAULT_DATA_DIR};
use crate::{
    cli::{Invocation, Outcome},
    context::ExecutionContext,
    engine::RestoreEngine,
    interrupt::{register_interrupt, InterruptBridge, InterruptSource},
    Error, Result,
};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Restores a cluster backup from a given directory
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "cluster-restore")]
pub struct RestoreOptions {
    /// Path to the kubernetes config directory
    #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Path to the data directory
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Path to the directory where the backup is generated
    #[arg(long)]
    pub backup_dir: Option<PathBuf>,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            backup_dir: None,
        }
    }
}

impl RestoreOptions {
    pub fn validate(&self) -> Result<()> {
        require_backup_dir(self.backup_dir.as_ref()).map(|_| ())
    }

    /// The validated backup directory.
    pub fn backup_dir(&self) -> Result<&Path> {
        require_backup_dir(self.backup_dir.as_ref())
    }

    /// Restore with SIGINT wired to cancellation.
    pub async fn run<E: RestoreEngine>(&self, engine: &E) -> Result<()> {
        let interrupts = register_interrupt().map_err(Error::Signal)?;
        self.run_with(engine, interrupts).await
    }

    /// Restore with cancellation driven by `interrupts`.
    ///
    /// The listener is released when this returns, whatever the outcome.
    pub async fn run_with<E, S>(&self, engine: &E, interrupts: S) -> Result<()>
    where
        E: RestoreEngine,
        S: InterruptSource,
    {
        let ctx = ExecutionContext::new();
        let _bridge = InterruptBridge::spawn(interrupts, ctx.clone());

        tracing::info!(backup_dir = ?self.backup_dir, "Starting cluster restore");

        if let Err(err) = engine.restore(&ctx, self).await {
            tracing::error!("run: restore failed: {:#}", err);
            return Err(err.into());
        }

        tracing::info!("Successfully restored the cluster from the backup!");
        Ok(())
    }
}

/// Validate and run a restore under the invocation's failure policy.
pub async fn execute<E: RestoreEngine>(
    options: &RestoreOptions,
    engine: &E,
    invocation: Invocation,
) -> Outcome {
    invocation
        .invoke(|| options.validate(), || options.run(engine))
        .await
}
