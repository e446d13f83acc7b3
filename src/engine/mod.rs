// Backup/restore engines - the seam between orchestration and the tools that move etcd data
pub mod etcdctl;
pub mod metadata;

#[cfg(test)]
mod etcdctl_tests;

pub use etcdctl::EtcdctlEngine;
pub use metadata::BackupMetadata;

use crate::{cli::BackupOptions, cli::RestoreOptions, context::ExecutionContext};
use std::future::Future;

/// Takes a backup of a live cluster.
pub trait BackupEngine {
    fn backup(&self, options: &BackupOptions) -> impl Future<Output = anyhow::Result<()>>;
}

/// Restores a cluster from local backup artifacts.
///
/// Implementations should stop in-progress work and return promptly once
/// `ctx` is cancelled.
pub trait RestoreEngine {
    fn restore(
        &self,
        ctx: &ExecutionContext,
        options: &RestoreOptions,
    ) -> impl Future<Output = anyhow::Result<()>>;
}
