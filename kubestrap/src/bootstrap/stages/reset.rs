//! MasterInit sub-step: reset leftovers of earlier runs.
//!
//! Without this a second attempt trips over existing etcd data and
//! certificates. Its failure policy is [`RESET_POLICY`](crate::bootstrap::RESET_POLICY).

use super::StageInput;
use crate::constants::remote_paths;
use crate::error::KubestrapResult;
use crate::remote::{CommandOutput, ShellCommand};

/// `kubeadm reset -f && rm -rf <kubernetes state> $HOME/.kube`
pub fn reset_command() -> ShellCommand {
    ShellCommand::new("kubeadm")
        .args(["reset", "-f"])
        .then("rm")
        .arg("-rf")
        .args(remote_paths::RESET_PATHS.iter().copied())
        .raw("$HOME/.kube")
}

pub async fn run(input: &StageInput<'_>) -> KubestrapResult<CommandOutput> {
    tracing::info!("Resetting leftovers of previous runs on control plane");
    input
        .runner
        .execute(&input.groups.control_plane, &reset_command())
        .await
}
