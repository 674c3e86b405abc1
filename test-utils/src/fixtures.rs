//! Canned inputs.

use kubestrap::config::BootstrapConfig;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A valid 64-hex-digit CA certificate hash.
pub const CA_HASH: &str = "7d2b0f7c6a1e9b4c3d5f8a0e1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b0c";

pub const BOOTSTRAP_TOKEN: &str = "abcdef.0123456789abcdef";

/// Tail of a successful `kubeadm init`, join command wrapped over two lines.
pub fn kubeadm_init_output(control_plane: &str) -> String {
    format!(
        "[init] Using Kubernetes version: v1.28.2\n\
         [preflight] Running pre-flight checks\n\
         [certs] Using certificateDir folder \"/etc/kubernetes/pki\"\n\
         [mark-control-plane] Marking the node k8s-master as control-plane\n\
         \n\
         Your Kubernetes control-plane has initialized successfully!\n\
         \n\
         Then you can join any number of worker nodes by running the following on each as root:\n\
         \n\
         kubeadm join {control_plane}:6443 --token {BOOTSTRAP_TOKEN} \\\n\
         \t--discovery-token-ca-cert-hash sha256:{CA_HASH}\n"
    )
}

/// Expected normalized join command for [`kubeadm_init_output`].
pub fn join_command(control_plane: &str) -> String {
    format!(
        "kubeadm join {control_plane}:6443 --token {BOOTSTRAP_TOKEN} \
         --discovery-token-ca-cert-hash sha256:{CA_HASH}"
    )
}

/// Scratch directory holding a config file and an empty playbook.
pub struct ConfigDir {
    pub dir: TempDir,
    pub config_path: PathBuf,
    pub playbook_path: PathBuf,
    pub inventory_path: PathBuf,
}

impl ConfigDir {
    /// Write a config for `control_plane` and `workers` with secret `pw`.
    pub fn new(control_plane: &str, workers: &[&str]) -> Self {
        Self::with_secret(control_plane, workers, Some("pw"))
    }

    pub fn with_secret(control_plane: &str, workers: &[&str], secret: Option<&str>) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let playbook_path = dir.path().join("k8s_init.yml");
        let inventory_path = dir.path().join("hosts.ini");
        let config_path = dir.path().join("config.yaml");

        std::fs::write(&playbook_path, "- hosts: all\n  tasks: []\n").expect("write playbook");

        let workers = workers
            .iter()
            .map(|w| format!("  - {w}\n"))
            .collect::<String>();
        let mut yaml = format!(
            "control_plane_address: {control_plane}\n\
             worker_addresses:\n{workers}\
             login_user: root\n\
             playbook_path: {}\n\
             inventory_path: {}\n",
            playbook_path.display(),
            inventory_path.display(),
        );
        if workers.is_empty() {
            yaml = yaml.replace("worker_addresses:\n", "worker_addresses: []\n");
        }
        if let Some(secret) = secret {
            yaml.push_str(&format!("login_secret: {secret}\n"));
        }
        std::fs::write(&config_path, yaml).expect("write config");

        Self {
            dir,
            config_path,
            playbook_path,
            inventory_path,
        }
    }

    /// Load the config, ignoring the process environment.
    pub fn load(&self) -> BootstrapConfig {
        BootstrapConfig::load_with_env(&self.config_path, |_| None).expect("load config")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
