use clap::{Parser, Subcommand};
use cluster_backup_restore::{
    cli::{self, BackupOptions, FailurePolicy, Invocation, RestoreOptions},
    engine::EtcdctlEngine,
    logging::LoggingConfig,
};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "cluster-etcd")]
#[command(about = "Operator tooling for etcd cluster backup and restore", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// etcdctl executable used by backup and restore
    #[arg(long, global = true, default_value = "etcdctl")]
    etcdctl: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Saves an etcd database snapshot and its backup metadata to a given directory
    ClusterBackup(BackupOptions),

    /// Restores a cluster backup from a given directory
    ClusterRestore(RestoreOptions),
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    LoggingConfig::new(args.verbose).init();

    let engine = EtcdctlEngine::with_program(&args.etcdctl);

    // Embedded subcommands treat any failure as fatal
    let invocation = Invocation::new(FailurePolicy::terminating(), std::io::stderr());

    let outcome = match args.command {
        Commands::ClusterBackup(options) => {
            cli::backup::execute(&options, &engine, invocation).await
        }
        Commands::ClusterRestore(options) => {
            cli::restore::execute(&options, &engine, invocation).await
        }
    };

    outcome.into()
}
