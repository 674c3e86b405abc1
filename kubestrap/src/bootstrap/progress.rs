//! Progress reporting hooks.

use super::state::Stage;
use super::types::StageResult;
use crate::error::KubestrapError;

/// Receives human-facing progress from the orchestrator.
///
/// All methods default to doing nothing.
pub trait Progress: Send {
    /// A stage is about to run.
    fn stage_started(&mut self, _stage: Stage) {}

    /// A notable step inside a stage (e.g. which worker is joining).
    fn step(&mut self, _stage: Stage, _message: &str) {}

    /// A line of remote output worth showing.
    fn output_line(&mut self, _stage: Stage, _line: &str) {}

    /// A stage finished, successfully or not.
    fn stage_finished(&mut self, _result: &StageResult) {}

    /// Something failed but the run continues.
    fn advisory(&mut self, _stage: Stage, _error: &KubestrapError) {}
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {}
