//! Bootstrap configuration.
//!
//! Loaded once from a YAML file and passed by reference into the
//! orchestrator. The login secret is resolved in two tiers: the
//! [`envs::LOGIN_SECRET`] environment variable wins over `login_secret`
//! in the file.

use crate::constants::{defaults, envs};
use crate::error::{ConfigError, KubestrapResult};
use crate::topology::ClusterTopology;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// On-disk shape of the config file.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    control_plane_address: String,
    #[serde(default)]
    worker_addresses: Vec<String>,
    login_user: String,
    #[serde(default)]
    login_secret: Option<String>,
    #[serde(default = "default_playbook_path")]
    playbook_path: PathBuf,
    #[serde(default = "default_inventory_path")]
    inventory_path: PathBuf,
    #[serde(default)]
    cluster: ClusterSettings,
}

/// kubeadm and network settings applied by the remote stages.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterSettings {
    /// Full package version, e.g. `v1.28.2-00`; only the part before `-` is passed to kubeadm.
    #[serde(default = "default_kubernetes_version")]
    pub kubernetes_version: String,

    #[serde(default = "default_image_repository")]
    pub image_repository: String,

    #[serde(default = "default_pod_network_cidr")]
    pub pod_network_cidr: String,

    #[serde(default = "default_control_plane_cri_socket")]
    pub control_plane_cri_socket: String,

    #[serde(default = "default_worker_cri_socket")]
    pub worker_cri_socket: String,

    /// Overlay-network manifest, already present on the control-plane host.
    #[serde(default = "default_network_manifest")]
    pub network_manifest: String,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            kubernetes_version: default_kubernetes_version(),
            image_repository: default_image_repository(),
            pod_network_cidr: default_pod_network_cidr(),
            control_plane_cri_socket: default_control_plane_cri_socket(),
            worker_cri_socket: default_worker_cri_socket(),
            network_manifest: default_network_manifest(),
        }
    }
}

impl ClusterSettings {
    /// Version as kubeadm expects it (`v1.28.2-00` → `v1.28.2`).
    pub fn short_kubernetes_version(&self) -> &str {
        self.kubernetes_version
            .split('-')
            .next()
            .unwrap_or(&self.kubernetes_version)
    }
}

fn default_playbook_path() -> PathBuf {
    PathBuf::from(defaults::PLAYBOOK)
}

fn default_inventory_path() -> PathBuf {
    PathBuf::from(defaults::INVENTORY_FILE)
}

fn default_kubernetes_version() -> String {
    defaults::KUBERNETES_VERSION.to_string()
}

fn default_image_repository() -> String {
    defaults::IMAGE_REPOSITORY.to_string()
}

fn default_pod_network_cidr() -> String {
    defaults::POD_NETWORK_CIDR.to_string()
}

fn default_control_plane_cri_socket() -> String {
    defaults::CONTROL_PLANE_CRI_SOCKET.to_string()
}

fn default_worker_cri_socket() -> String {
    defaults::WORKER_CRI_SOCKET.to_string()
}

fn default_network_manifest() -> String {
    defaults::NETWORK_MANIFEST.to_string()
}

/// Fully resolved configuration for one bootstrap run.
#[derive(Clone)]
pub struct BootstrapConfig {
    pub control_plane_address: String,
    pub worker_addresses: Vec<String>,
    pub login_user: String,
    login_secret: String,
    pub playbook_path: PathBuf,
    pub inventory_path: PathBuf,
    pub cluster: ClusterSettings,
}

impl BootstrapConfig {
    /// Load from `path`, reading the secret override from the process environment.
    pub fn load(path: &Path) -> KubestrapResult<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load from `path` with an explicit environment lookup.
    pub fn load_with_env<F>(path: &Path, env: F) -> KubestrapResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text, path, env)
    }

    /// Parse YAML text. `path` is only used in error messages.
    pub fn from_yaml<F>(text: &str, path: &Path, env: F) -> KubestrapResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: ConfigFile = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let login_secret = resolve_secret(env(envs::LOGIN_SECRET), file.login_secret).ok_or(
            ConfigError::MissingSecret {
                env_var: envs::LOGIN_SECRET,
                config_path: path.to_path_buf(),
            },
        )?;

        tracing::debug!(
            path = %path.display(),
            workers = file.worker_addresses.len(),
            "Loaded bootstrap config"
        );

        Ok(Self {
            control_plane_address: file.control_plane_address,
            worker_addresses: file.worker_addresses,
            login_user: file.login_user,
            login_secret,
            playbook_path: file.playbook_path,
            inventory_path: file.inventory_path,
            cluster: file.cluster,
        })
    }

    pub fn login_secret(&self) -> &str {
        &self.login_secret
    }

    /// Validated topology for this config.
    pub fn topology(&self) -> KubestrapResult<ClusterTopology> {
        ClusterTopology::new(
            self.control_plane_address.clone(),
            self.worker_addresses.iter().cloned(),
            self.login_user.clone(),
            self.login_secret.clone(),
        )
    }
}

impl fmt::Debug for BootstrapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapConfig")
            .field("control_plane_address", &self.control_plane_address)
            .field("worker_addresses", &self.worker_addresses)
            .field("login_user", &self.login_user)
            .field("login_secret", &"<redacted>")
            .field("playbook_path", &self.playbook_path)
            .field("inventory_path", &self.inventory_path)
            .field("cluster", &self.cluster)
            .finish()
    }
}

/// Environment value first, then file value; blank values don't count.
fn resolve_secret(from_env: Option<String>, from_file: Option<String>) -> Option<String> {
    [from_env, from_file]
        .into_iter()
        .flatten()
        .find(|secret| !secret.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KubestrapError;

    const MINIMAL: &str = r#"
control_plane_address: 10.0.0.10
worker_addresses: [10.0.0.11, 10.0.0.12]
login_user: root
"#;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_env_secret_wins_over_file() {
        let yaml = format!("{MINIMAL}login_secret: from-file\n");
        let config = BootstrapConfig::from_yaml(&yaml, Path::new("config.yaml"), |key| {
            (key == envs::LOGIN_SECRET).then(|| "from-env".to_string())
        })
        .unwrap();

        assert_eq!(config.login_secret(), "from-env");
    }

    #[test]
    fn test_file_secret_used_when_env_blank() {
        let yaml = format!("{MINIMAL}login_secret: from-file\n");
        let config =
            BootstrapConfig::from_yaml(&yaml, Path::new("config.yaml"), |_| Some("  ".into()))
                .unwrap();

        assert_eq!(config.login_secret(), "from-file");
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let err = BootstrapConfig::from_yaml(MINIMAL, Path::new("cluster.yaml"), no_env)
            .unwrap_err();

        match err {
            KubestrapError::Config(ConfigError::MissingSecret {
                env_var,
                config_path,
            }) => {
                assert_eq!(env_var, envs::LOGIN_SECRET);
                assert_eq!(config_path, PathBuf::from("cluster.yaml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_defaults_applied() {
        let yaml = format!("{MINIMAL}login_secret: s\n");
        let config = BootstrapConfig::from_yaml(&yaml, Path::new("c.yaml"), no_env).unwrap();

        assert_eq!(config.playbook_path, PathBuf::from(defaults::PLAYBOOK));
        assert_eq!(config.inventory_path, PathBuf::from(defaults::INVENTORY_FILE));
        assert_eq!(config.cluster, ClusterSettings::default());
        assert_eq!(config.worker_addresses.len(), 2);
    }

    #[test]
    fn test_short_kubernetes_version() {
        let settings = ClusterSettings {
            kubernetes_version: "v1.28.2-00".into(),
            ..Default::default()
        };
        assert_eq!(settings.short_kubernetes_version(), "v1.28.2");
        assert_eq!(
            ClusterSettings::default().short_kubernetes_version(),
            "v1.28.2"
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = format!("{MINIMAL}login_secret: s\nmaster_ip: 1.2.3.4\n");
        let err = BootstrapConfig::from_yaml(&yaml, Path::new("c.yaml"), no_env).unwrap_err();
        assert!(matches!(err, KubestrapError::Config(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let yaml = format!("{MINIMAL}login_secret: hunter2\n");
        let config = BootstrapConfig::from_yaml(&yaml, Path::new("c.yaml"), no_env).unwrap();
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
