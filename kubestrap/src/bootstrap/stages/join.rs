//! Stage 4: worker enrollment.
//!
//! Workers join one at a time, in topology order. The first failure stops
//! the stage; workers after it are not attempted.

use super::StageInput;
use crate::bootstrap::progress::Progress;
use crate::bootstrap::state::Stage;
use crate::config::BootstrapConfig;
use crate::constants::nodes;
use crate::error::KubestrapResult;
use crate::remote::{CommandOutput, ShellCommand};
use crate::token::EnrollmentToken;

/// The extracted join command plus this worker's node name and CRI socket.
pub fn join_command(token: &EnrollmentToken, index: usize, config: &BootstrapConfig) -> ShellCommand {
    let mut words = token.words();
    let program = words.next().unwrap_or("kubeadm");
    ShellCommand::new(program)
        .args(words)
        .flag("--node-name", nodes::worker_name(index))
        .flag("--cri-socket", &config.cluster.worker_cri_socket)
}

/// Join every worker; returns the concatenated output of all joins.
pub async fn run(
    input: &StageInput<'_>,
    token: &EnrollmentToken,
    progress: &mut dyn Progress,
) -> KubestrapResult<CommandOutput> {
    let mut combined = CommandOutput::default();

    for (index, worker) in input.groups.workers.split().enumerate() {
        let node_name = nodes::worker_name(index);
        progress.step(
            Stage::WorkersJoined,
            &format!("joining {} as {}", worker.name(), node_name),
        );
        tracing::info!(worker = %worker.name(), node = %node_name, "Joining worker");

        let output = input
            .runner
            .execute(&worker, &join_command(token, index, input.config))
            .await?;
        combined.output.push_str(&output.output);
    }

    Ok(combined)
}
