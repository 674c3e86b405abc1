//! Stage 2: control-plane initialization.
//!
//! Runs `kubeadm init` on the control plane and streams its output. Only
//! progress lines are echoed; the full text is returned for extraction.

use super::StageInput;
use crate::bootstrap::progress::Progress;
use crate::bootstrap::state::Stage;
use crate::config::BootstrapConfig;
use crate::constants::nodes;
use crate::error::KubestrapResult;
use crate::remote::{CommandOutput, ShellCommand};

/// `kubeadm init` with the cluster settings from `config`.
pub fn init_command(config: &BootstrapConfig) -> ShellCommand {
    let cluster = &config.cluster;
    ShellCommand::new("kubeadm")
        .arg("init")
        .flag("--kubernetes-version", cluster.short_kubernetes_version())
        .flag("--pod-network-cidr", &cluster.pod_network_cidr)
        .flag("--image-repository", &cluster.image_repository)
        .flag("--apiserver-advertise-address", &config.control_plane_address)
        .flag("--node-name", nodes::CONTROL_PLANE_NAME)
        .flag("--ignore-preflight-errors", "all")
        .flag("--cri-socket", &cluster.control_plane_cri_socket)
        .flag("--v", "5")
}

/// kubeadm phase markers (`[init]`, `[certs]`, ...) and lines about the node.
pub fn is_progress_line(line: &str) -> bool {
    line.contains('[') || line.contains(nodes::CONTROL_PLANE_NAME)
}

pub async fn run(
    input: &StageInput<'_>,
    progress: &mut dyn Progress,
) -> KubestrapResult<CommandOutput> {
    tracing::info!(
        control_plane = %input.config.control_plane_address,
        "Running kubeadm init"
    );

    let command = init_command(input.config);
    let mut execution = input
        .runner
        .execute_streaming(&input.groups.control_plane, &command)
        .await?;

    while let Some(line) = execution.next_line().await {
        if is_progress_line(&line) {
            progress.output_line(Stage::MasterInit, &line);
        }
    }

    execution.finish().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config() -> BootstrapConfig {
        let yaml = r#"
control_plane_address: 10.0.0.1
login_user: root
login_secret: pw
cluster:
  kubernetes_version: v1.28.2-00
"#;
        BootstrapConfig::from_yaml(yaml, Path::new("c.yaml"), |_| None).unwrap()
    }

    #[test]
    fn test_init_command() {
        assert_eq!(
            init_command(&config()).render(),
            "kubeadm init --kubernetes-version=v1.28.2 --pod-network-cidr=10.244.0.0/16 \
             --image-repository=registry.aliyuncs.com/google_containers \
             --apiserver-advertise-address=10.0.0.1 --node-name=k8s-master \
             --ignore-preflight-errors=all \
             --cri-socket=unix:///run/containerd/containerd.sock --v=5"
        );
    }

    #[test]
    fn test_progress_filter() {
        assert!(is_progress_line("[init] Using Kubernetes version: v1.28.2"));
        assert!(is_progress_line("Node k8s-master registered"));
        assert!(!is_progress_line("I0101 00:00:00.000 round_trippers.go:553] GET"));
        assert!(!is_progress_line("To start using your cluster, you need to run"));
    }
}
