//! Entry point for the kubestrap CLI.

mod cli;
mod commands;
mod progress;

use clap::Parser;
use cli::{Commands, GlobalFlags, KubestrapCli};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE: &str = "kubestrap.log";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before parsing, so `.env` can supply KUBESTRAP_CONFIG too
    let env_files = cli::load_env_files(&cli::env_file_candidates())?;
    let cli = KubestrapCli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&cli.global);
    for path in &env_files {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    match cli.command {
        Commands::Bootstrap(args) => commands::bootstrap::execute(args, &cli.global).await,
        Commands::Inventory(args) => commands::inventory::execute(args, &cli.global).await,
        Commands::JoinCommand(args) => commands::join_command::execute(args, &cli.global).await,
        Commands::Stages => commands::stages::execute(&cli.global).await,
    }
}

/// Log to stderr, and additionally to `<log-dir>/kubestrap.log` when asked.
fn init_logging(global: &GlobalFlags) -> Option<WorkerGuard> {
    if let Some(log_dir) = &global.log_dir {
        match std::fs::create_dir_all(log_dir) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                kubestrap::util::register_to_tracing(non_blocking, global.log_filter());
                return Some(guard);
            }
            Err(e) => {
                eprintln!(
                    "[WARN] Cannot create log directory {}: {}; logging to stderr only",
                    log_dir.display(),
                    e
                );
            }
        }
    }

    if let Err(e) = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(global.log_filter())
        .try_init()
    {
        eprintln!("[ERROR] Failed to initialize tracing: {}", e);
    }
    None
}
