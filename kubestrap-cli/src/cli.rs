use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use kubestrap::constants::{defaults, envs};
use kubestrap::{BootstrapConfig, ClusterTopology};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::commands;

/// Bootstrap a Kubernetes cluster on bare hosts through Ansible.
#[derive(Parser, Debug)]
#[command(name = "kubestrap", author, version, about, long_about = None)]
pub struct KubestrapCli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every bootstrap stage against the configured hosts
    Bootstrap(commands::bootstrap::BootstrapArgs),

    /// Generate the host inventory without touching any host
    Inventory(commands::inventory::InventoryArgs),

    /// Extract the worker join command from saved `kubeadm init` output
    JoinCommand(commands::join_command::JoinCommandArgs),

    /// List the bootstrap stages and their failure policy
    Stages,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalFlags {
    /// Path to the cluster config file
    #[arg(short, long, global = true, env = envs::CONFIG_PATH, default_value = defaults::CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Also write logs to <LOG_DIR>/kubestrap.log
    #[arg(long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl GlobalFlags {
    /// `debug` with `--debug`, otherwise RUST_LOG, otherwise `warn`.
    pub fn log_filter(&self) -> EnvFilter {
        if self.debug {
            return EnvFilter::new("debug");
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }

    pub fn load_config(&self) -> anyhow::Result<BootstrapConfig> {
        let config = BootstrapConfig::load(&self.config)
            .with_context(|| format!("failed to load config {}", self.config.display()))?;
        tracing::debug!(
            secret_len = config.login_secret().len(),
            "Resolved login secret"
        );
        Ok(config)
    }
}

/// Operator-facing note that a credential was found, without revealing it.
pub fn secret_notice(config: &BootstrapConfig) -> String {
    format!(
        "Login secret loaded ({} characters)",
        config.login_secret().chars().count()
    )
}

/// `.env` files consulted before the command line is parsed: next to the
/// executable first, then the working directory.
pub fn env_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(defaults::ENV_FILE));
    }
    candidates.push(PathBuf::from(defaults::ENV_FILE));
    candidates
}

/// Load every `.env` in `candidates` that exists.
///
/// Variables already set in the process environment are never replaced,
/// and an earlier file wins over a later one. Returns the files loaded.
pub fn load_env_files(candidates: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut loaded = Vec::new();
    for path in candidates {
        match dotenvy::from_path(path) {
            Ok(()) => loaded.push(path.clone()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e).with_context(|| format!("failed to load {}", path.display())),
        }
    }
    Ok(loaded)
}

/// Topology from `config`, minus the workers named in `skip`.
pub fn topology_without(
    config: &BootstrapConfig,
    skip: &[String],
) -> anyhow::Result<ClusterTopology> {
    let mut topology = config.topology()?;
    for worker in skip {
        if !topology.remove_worker(worker) {
            anyhow::bail!("--skip-worker {}: not a worker in the config", worker);
        }
        tracing::info!(worker = %worker, "Skipping worker");
    }
    Ok(topology)
}
