use clap::Parser;
use cluster_backup_restore::{
    cli::{self, BackupOptions, FailurePolicy, Invocation},
    engine::EtcdctlEngine,
    logging::LoggingConfig,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let options = BackupOptions::parse();

    LoggingConfig::default().init();

    let invocation = Invocation::new(FailurePolicy::reporting(), std::io::stderr());
    cli::backup::execute(&options, &EtcdctlEngine::new(), invocation)
        .await
        .into()
}
