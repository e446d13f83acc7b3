use clap::Parser;
use cluster_backup_restore::{
    cli::{self, FailurePolicy, Invocation, RestoreOptions},
    engine::EtcdctlEngine,
    logging::LoggingConfig,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let options = RestoreOptions::parse();

    LoggingConfig::default().init();

    let invocation = Invocation::new(FailurePolicy::reporting(), std::io::stderr());
    cli::restore::execute(&options, &EtcdctlEngine::new(), invocation)
        .await
        .into()
}
