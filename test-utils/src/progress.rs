use kubestrap::bootstrap::{Progress, Stage, StageResult};
use kubestrap::error::KubestrapError;
use parking_lot::Mutex;
use std::sync::Arc;

/// Progress sink that records events as short strings.
///
/// Clones share the same event log, so a test can hand one clone to the
/// orchestrator and inspect the other afterwards.
#[derive(Clone, Debug, Default)]
pub struct RecordingProgress {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    /// Events starting with `prefix`, e.g. `"advisory:"`.
    pub fn events_with(&self, prefix: &str) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn push(&self, event: String) {
        self.events.lock().push(event);
    }
}

impl Progress for RecordingProgress {
    fn stage_started(&mut self, stage: Stage) {
        self.push(format!("started:{stage}"));
    }

    fn step(&mut self, stage: Stage, message: &str) {
        self.push(format!("step:{stage}:{message}"));
    }

    fn output_line(&mut self, stage: Stage, line: &str) {
        self.push(format!("line:{stage}:{line}"));
    }

    fn stage_finished(&mut self, result: &StageResult) {
        self.push(format!("finished:{}:{}", result.stage, result.status));
    }

    fn advisory(&mut self, stage: Stage, error: &KubestrapError) {
        self.push(format!("advisory:{stage}:{error}"));
    }
}
