//! Constants for kubestrap
//!
//! Centralized location for hardcoded values, paths, and remote command defaults.

pub mod envs {
    /// Login secret; takes precedence over `login_secret` in the config file.
    pub const LOGIN_SECRET: &str = "KUBESTRAP_SSH_PASSWORD";

    /// Config file path override for the CLI.
    pub const CONFIG_PATH: &str = "KUBESTRAP_CONFIG";
}

/// Inventory group names as the configuration-management tool sees them.
pub mod groups {
    pub const CONTROL_PLANE: &str = "master";
    pub const WORKERS: &str = "nodes";
}

/// Defaults for fields omitted from the config file.
pub mod defaults {
    pub const CONFIG_FILE: &str = "config.yaml";
    pub const ENV_FILE: &str = ".env";
    pub const PLAYBOOK: &str = "k8s_init.yml";
    pub const INVENTORY_FILE: &str = "hosts.ini";
    pub const KUBERNETES_VERSION: &str = "v1.28.2";
    pub const IMAGE_REPOSITORY: &str = "registry.aliyuncs.com/google_containers";
    pub const POD_NETWORK_CIDR: &str = "10.244.0.0/16";
    pub const CONTROL_PLANE_CRI_SOCKET: &str = "unix:///run/containerd/containerd.sock";
    pub const WORKER_CRI_SOCKET: &str = "unix:///var/run/containerd/containerd.sock";
    pub const NETWORK_MANIFEST: &str = "/tmp/calico.yaml";
}

/// Node naming on the cluster side.
pub mod nodes {
    pub const CONTROL_PLANE_NAME: &str = "k8s-master";

    /// Worker names are `k8s-node1`, `k8s-node2`, ... in topology order.
    pub fn worker_name(index: usize) -> String {
        format!("k8s-node{}", index + 1)
    }
}

/// Transport settings for the ansible binaries.
pub mod transport {
    use std::time::Duration;

    pub const ANSIBLE: &str = "ansible";
    pub const ANSIBLE_PLAYBOOK: &str = "ansible-playbook";

    /// Connection-establishment timeout. Remote execution itself is unbounded.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Environment applied to every ansible invocation.
    pub const ANSIBLE_ENV: &[(&str, &str)] = &[
        ("ANSIBLE_HOST_KEY_CHECKING", "False"),
        ("ANSIBLE_NOCOLOR", "1"),
        ("ANSIBLE_FORCE_COLOR", "0"),
    ];
}

/// Paths on the control-plane host.
pub mod remote_paths {
    pub const ADMIN_KUBECONFIG: &str = "/etc/kubernetes/admin.conf";

    /// State removed before `kubeadm init` so earlier failed runs don't collide.
    pub const RESET_PATHS: &[&str] = &["/etc/kubernetes/", "/var/lib/etcd/", "/var/lib/kubelet/"];
}

/// Maximum characters of captured output embedded in error messages.
pub const OUTPUT_PREVIEW_CHARS: usize = 200;
