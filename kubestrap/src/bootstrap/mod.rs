//! Cluster bootstrap orchestration.
//!
//! ## Architecture
//!
//! A run walks a fixed sequence of stages, one state per stage:
//!
//! ```text
//! Idle ──→ Preparing ──→ MasterInit ──→ TokenExtracted ──→ KubeconfigReady
//!      ──→ WorkersJoined ──→ NetworkInstalled ──→ Done
//!
//! Fatal:    everything except KubeconfigReady  → Failed(stage), run stops
//! Advisory: KubeconfigReady, reset before init → warning, run continues
//! ```
//!
//! Stages return plain errors; [`Orchestrator`] applies the failure policy
//! from [`Stage::policy`] and owns every state transition.

mod progress;
pub mod stages;
mod state;
mod types;

pub use progress::{NoProgress, Progress};
pub use state::{BootstrapState, FailurePolicy, RESET_POLICY, Stage};
pub use types::{RunReport, StageRecord, StageResult, StageStatus};

use crate::config::BootstrapConfig;
use crate::error::{KubestrapError, KubestrapResult};
use crate::inventory::{HostGroups, InventoryWriter};
use crate::remote::RemoteRunner;
use crate::token::EnrollmentToken;
use crate::topology::ClusterTopology;
use stages::StageInput;

/// Drives a cluster from bare hosts to a running cluster.
///
/// # Example
///
/// ```ignore
/// let runner = AnsibleRunner::new(&config.inventory_path);
/// let writer = FileInventoryWriter::new(&config.inventory_path);
/// let mut orchestrator = Orchestrator::new(&config, &topology, &runner, &writer);
/// orchestrator.run().await?;
/// assert!(orchestrator.state().is_done());
/// ```
pub struct Orchestrator<'a> {
    config: &'a BootstrapConfig,
    topology: &'a ClusterTopology,
    runner: &'a dyn RemoteRunner,
    inventory: &'a dyn InventoryWriter,
    progress: Box<dyn Progress + 'a>,

    state: BootstrapState,
    groups: Option<HostGroups>,
    init_output: Option<String>,
    token: Option<EnrollmentToken>,
    report: RunReport,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a BootstrapConfig,
        topology: &'a ClusterTopology,
        runner: &'a dyn RemoteRunner,
        inventory: &'a dyn InventoryWriter,
    ) -> Self {
        Self {
            config,
            topology,
            runner,
            inventory,
            progress: Box::new(NoProgress),
            state: BootstrapState::Idle,
            groups: None,
            init_output: None,
            token: None,
            report: RunReport::default(),
        }
    }

    /// Report progress to `progress` instead of discarding it.
    pub fn with_progress(mut self, progress: impl Progress + 'a) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// Join command, once `TokenExtracted` has succeeded.
    pub fn token(&self) -> Option<&EnrollmentToken> {
        self.token.as_ref()
    }

    /// Run every remaining stage.
    ///
    /// Returns `Ok` once the state is `Done`. A fatal failure leaves the
    /// state at `Failed(stage)` and returns the error labeled with that
    /// stage. A run can only be driven once; calling this after a failure
    /// returns `InvalidState`.
    pub async fn run(&mut self) -> KubestrapResult<()> {
        if let BootstrapState::Failed(stage) = self.state {
            return Err(KubestrapError::InvalidState(format!(
                "run already failed in stage '{}'",
                stage
            )));
        }

        while let Some(stage) = self.state.stage() {
            tracing::info!(stage = %stage, "{}", stage.description());
            self.progress.stage_started(stage);

            match self.run_stage(stage).await {
                Ok(result) => {
                    self.finish_stage(result, None);
                    self.advance(stage.next());
                }
                Err(err) => match stage.policy() {
                    FailurePolicy::Fatal => {
                        tracing::error!(stage = %stage, error = %err, "Stage failed, stopping run");
                        let result = StageResult::failed(stage, StageStatus::Fatal, &err);
                        self.finish_stage(result, Some(err.to_string()));
                        self.advance(BootstrapState::Failed(stage));
                        return Err(err.in_stage(stage));
                    }
                    FailurePolicy::Advisory => {
                        tracing::warn!(stage = %stage, error = %err, "Stage failed, continuing");
                        self.progress.advisory(stage, &err);
                        let result = StageResult::failed(stage, StageStatus::AdvisoryFailed, &err);
                        self.finish_stage(result, Some(err.to_string()));
                        self.advance(stage.next());
                    }
                },
            }
        }

        tracing::info!(state = %self.state, "Bootstrap run finished");
        Ok(())
    }

    async fn run_stage(&mut self, stage: Stage) -> KubestrapResult<StageResult> {
        let output = match stage {
            Stage::Idle => {
                let groups = stages::inventory::run(self.topology, self.inventory)?;
                self.groups = Some(groups);
                String::new()
            }
            Stage::Preparing => {
                stages::prepare::run(self.config, self.runner, self.progress.as_mut())
                    .await?
                    .output
            }
            Stage::MasterInit => {
                let input = stage_input(self.config, self.runner, &self.groups, stage)?;
                if let Err(err) = stages::reset::run(&input).await {
                    apply_reset_policy(self.progress.as_mut(), err)?;
                }
                let out = stages::master_init::run(&input, self.progress.as_mut()).await?;
                self.init_output = Some(out.output.clone());
                out.output
            }
            Stage::TokenExtracted => {
                let init_output = self.init_output.as_deref().unwrap_or_default();
                let token = stages::extract::run(init_output)?;
                self.token = Some(token.clone());
                return Ok(StageResult::ok(stage, String::new()).with_artifact(token));
            }
            Stage::KubeconfigReady => {
                let input = stage_input(self.config, self.runner, &self.groups, stage)?;
                stages::kubeconfig::run(&input).await?.output
            }
            Stage::WorkersJoined => {
                let input = stage_input(self.config, self.runner, &self.groups, stage)?;
                let token = self.token.as_ref().ok_or_else(|| {
                    KubestrapError::InvalidState("no join command extracted".to_string())
                })?;
                stages::join::run(&input, token, self.progress.as_mut())
                    .await?
                    .output
            }
            Stage::NetworkInstalled => {
                let input = stage_input(self.config, self.runner, &self.groups, stage)?;
                stages::network::run(&input).await?.output
            }
        };

        Ok(StageResult::ok(stage, output))
    }

    fn finish_stage(&mut self, result: StageResult, detail: Option<String>) {
        self.progress.stage_finished(&result);
        self.report.push(StageRecord {
            stage: result.stage,
            status: result.status,
            detail,
        });
    }

    fn advance(&mut self, target: BootstrapState) {
        debug_assert!(
            self.state.can_transition_to(target),
            "invalid transition {} -> {}",
            self.state,
            target
        );
        tracing::debug!(from = %self.state, to = %target, "State transition");
        self.state = target;
    }
}

fn stage_input<'b>(
    config: &'b BootstrapConfig,
    runner: &'b dyn RemoteRunner,
    groups: &'b Option<HostGroups>,
    stage: Stage,
) -> KubestrapResult<StageInput<'b>> {
    let groups = groups.as_ref().ok_or_else(|| {
        KubestrapError::InvalidState(format!("host groups missing in stage '{}'", stage))
    })?;
    Ok(StageInput {
        config,
        runner,
        groups,
    })
}

/// Apply [`RESET_POLICY`] to a failed reset.
fn apply_reset_policy(progress: &mut dyn Progress, err: KubestrapError) -> KubestrapResult<()> {
    match RESET_POLICY {
        FailurePolicy::Advisory => {
            tracing::warn!(error = %err, "Reset before init failed, continuing");
            progress.advisory(Stage::MasterInit, &err);
            Ok(())
        }
        FailurePolicy::Fatal => Err(err),
    }
}
