//! Stage 3: kubectl access for the login user on the control plane.
//!
//! Operator convenience only; the cluster works without it.

use super::StageInput;
use crate::constants::remote_paths;
use crate::error::KubestrapResult;
use crate::remote::{CommandOutput, ShellCommand};

/// `mkdir -p $HOME/.kube && cp -f <admin.conf> $HOME/.kube/config && chown ...`
pub fn kubeconfig_command() -> ShellCommand {
    ShellCommand::new("mkdir")
        .arg("-p")
        .raw("$HOME/.kube")
        .then("cp")
        .arg("-f")
        .arg(remote_paths::ADMIN_KUBECONFIG)
        .raw("$HOME/.kube/config")
        .then("chown")
        .raw("$(id -u):$(id -g)")
        .raw("$HOME/.kube/config")
}

pub async fn run(input: &StageInput<'_>) -> KubestrapResult<CommandOutput> {
    input
        .runner
        .execute(&input.groups.control_plane, &kubeconfig_command())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kubeconfig_command() {
        assert_eq!(
            kubeconfig_command().render(),
            "mkdir -p $HOME/.kube && cp -f /etc/kubernetes/admin.conf $HOME/.kube/config \
             && chown $(id -u):$(id -g) $HOME/.kube/config"
        );
    }
}
