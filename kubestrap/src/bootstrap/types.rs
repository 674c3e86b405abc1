//! Type definitions for the bootstrap run.

use super::state::{BootstrapState, Stage};
use crate::error::KubestrapError;
use crate::token::EnrollmentToken;
use std::fmt;

/// How a stage invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Ok,
    Fatal,
    AdvisoryFailed,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Ok => "ok",
            StageStatus::Fatal => "fatal",
            StageStatus::AdvisoryFailed => "advisory-failed",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one stage invocation.
///
/// Built by the orchestrator once the stage's policy has been applied and
/// consumed right away; it is never persisted.
#[derive(Debug, Clone)]
pub struct StageResult {
    pub stage: Stage,
    pub status: StageStatus,
    /// Captured remote output, when the stage produced any.
    pub output: String,
    /// Join command, only set by `TokenExtracted`.
    pub artifact: Option<EnrollmentToken>,
}

impl StageResult {
    pub fn ok(stage: Stage, output: impl Into<String>) -> Self {
        Self {
            stage,
            status: StageStatus::Ok,
            output: output.into(),
            artifact: None,
        }
    }

    /// Failed result; keeps the remote output carried by `error`, if any.
    pub fn failed(stage: Stage, status: StageStatus, error: &KubestrapError) -> Self {
        let output = match error.root() {
            KubestrapError::RemoteExecution(e) => e.output.clone(),
            _ => String::new(),
        };
        Self {
            stage,
            status,
            output,
            artifact: None,
        }
    }

    pub fn with_artifact(mut self, token: EnrollmentToken) -> Self {
        self.artifact = Some(token);
        self
    }
}

/// One line of the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    pub stage: Stage,
    pub status: StageStatus,
    /// Error message for failed stages.
    pub detail: Option<String>,
}

/// Summary of a bootstrap run, in execution order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    records: Vec<StageRecord>,
}

impl RunReport {
    pub fn records(&self) -> &[StageRecord] {
        &self.records
    }

    pub fn push(&mut self, record: StageRecord) {
        self.records.push(record);
    }

    /// Stages that failed without stopping the run.
    pub fn advisories(&self) -> impl Iterator<Item = &StageRecord> {
        self.records
            .iter()
            .filter(|r| r.status == StageStatus::AdvisoryFailed)
    }

    /// Status of `stage`, if it ran.
    pub fn status_of(&self, stage: Stage) -> Option<StageStatus> {
        self.records
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| r.status)
    }

    /// State the run ended in, derived from the records.
    pub fn final_state(&self) -> BootstrapState {
        match self.records.last() {
            None => BootstrapState::Idle,
            Some(r) if r.status == StageStatus::Fatal => BootstrapState::Failed(r.stage),
            Some(r) => r.stage.next(),
        }
    }
}
