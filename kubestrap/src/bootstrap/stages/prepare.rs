//! Stage 1: environment preparation.
//!
//! Runs the preparation playbook (packages, container runtime, offline
//! images) against every host and streams its output.

use crate::bootstrap::progress::Progress;
use crate::bootstrap::state::Stage;
use crate::config::BootstrapConfig;
use crate::error::{ConfigError, KubestrapResult};
use crate::remote::{CommandOutput, RemoteRunner};

pub async fn run(
    config: &BootstrapConfig,
    runner: &dyn RemoteRunner,
    progress: &mut dyn Progress,
) -> KubestrapResult<CommandOutput> {
    if !config.playbook_path.is_file() {
        return Err(ConfigError::PlaybookNotFound(config.playbook_path.clone()).into());
    }

    let mut execution = runner.run_playbook(&config.playbook_path).await?;
    while let Some(line) = execution.next_line().await {
        progress.output_line(Stage::Preparing, &line);
    }
    execution.finish().await
}
