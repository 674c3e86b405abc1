//! Console progress output for `kubestrap bootstrap`.

use kubestrap::bootstrap::{Progress, Stage, StageResult, StageStatus};
use kubestrap::error::KubestrapError;

/// Prints stage banners and selected remote output to stdout, warnings to stderr.
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn stage_started(&mut self, stage: Stage) {
        match stage.step() {
            Some((n, total)) => println!("[{}/{}] {}...", n, total, stage.description()),
            None => println!("{}...", stage.description()),
        }
    }

    fn step(&mut self, _stage: Stage, message: &str) {
        println!("  {}", message);
    }

    fn output_line(&mut self, _stage: Stage, line: &str) {
        println!("    {}", line);
    }

    fn stage_finished(&mut self, result: &StageResult) {
        if result.status == StageStatus::Fatal && !result.output.is_empty() {
            eprintln!("--- remote output ({}) ---", result.stage);
            eprintln!("{}", result.output.trim_end());
        }
        if let Some(token) = &result.artifact {
            println!("  join command: {}", token);
        }
    }

    fn advisory(&mut self, stage: Stage, error: &KubestrapError) {
        eprintln!("warning: {} failed, continuing: {}", stage, error);
    }
}
