//! Stage 5: overlay network.
//!
//! Applies the network manifest already staged on the control plane by
//! the preparation playbook.

use super::StageInput;
use crate::config::BootstrapConfig;
use crate::constants::remote_paths;
use crate::error::KubestrapResult;
use crate::remote::{CommandOutput, ShellCommand};

/// `KUBECONFIG=<admin.conf> kubectl apply -f <manifest>`
pub fn apply_command(config: &BootstrapConfig) -> ShellCommand {
    ShellCommand::new("kubectl")
        .env("KUBECONFIG", remote_paths::ADMIN_KUBECONFIG)
        .args(["apply", "-f"])
        .arg(&config.cluster.network_manifest)
}

pub async fn run(input: &StageInput<'_>) -> KubestrapResult<CommandOutput> {
    tracing::info!(manifest = %input.config.cluster.network_manifest, "Applying network manifest");
    input
        .runner
        .execute(&input.groups.control_plane, &apply_command(input.config))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_apply_command() {
        let yaml = "control_plane_address: 10.0.0.1\nlogin_user: root\nlogin_secret: pw\n";
        let config = BootstrapConfig::from_yaml(yaml, Path::new("c.yaml"), |_| None).unwrap();
        assert_eq!(
            apply_command(&config).render(),
            "KUBECONFIG=/etc/kubernetes/admin.conf kubectl apply -f /tmp/calico.yaml"
        );
    }
}
