//! Remote command execution.
//!
//! The runner is a dumb transport: it takes a resolved [`HostGroup`] and a
//! fully rendered [`ShellCommand`], runs it, and reports what happened.
//! It never retries and never decides whether a failure matters; that is
//! the orchestrator's job.

mod ansible;
mod command;
mod outcome;

pub use ansible::AnsibleRunner;
pub use command::{ShellCommand, quote};
pub use outcome::classify;

use crate::error::KubestrapResult;
use crate::inventory::HostGroup;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{Future, Stream, StreamExt};
use std::path::Path;

/// Captured result of a remote command that exited zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Combined stdout/stderr text.
    pub output: String,
    pub exit_code: i32,
}

/// Transport for remote commands.
#[async_trait]
pub trait RemoteRunner: Send + Sync {
    /// Run a playbook against the whole inventory.
    async fn run_playbook(&self, playbook: &Path) -> KubestrapResult<StreamingExecution>;

    /// Run `command` on every host of `group` and wait for it.
    async fn execute(
        &self,
        group: &HostGroup,
        command: &ShellCommand,
    ) -> KubestrapResult<CommandOutput>;

    /// Run `command` on `group`, yielding output lines as they arrive.
    async fn execute_streaming(
        &self,
        group: &HostGroup,
        command: &ShellCommand,
    ) -> KubestrapResult<StreamingExecution>;
}

/// A remote command in flight.
///
/// Read lines with [`next_line`](Self::next_line), then call
/// [`finish`](Self::finish) to drain the rest and get the classified
/// result. Every line handed out is also kept, so the final
/// [`CommandOutput`] always holds the complete text.
///
/// Dropping an execution releases the underlying session.
pub struct StreamingExecution {
    target: String,
    lines: BoxStream<'static, String>,
    status: BoxFuture<'static, KubestrapResult<i32>>,
    collected: String,
}

impl StreamingExecution {
    /// Wrap a line stream and the future resolving to the exit code.
    ///
    /// `status` is only polled after `lines` has ended.
    pub fn new<L, F>(target: impl Into<String>, lines: L, status: F) -> Self
    where
        L: Stream<Item = String> + Send + 'static,
        F: Future<Output = KubestrapResult<i32>> + Send + 'static,
    {
        Self {
            target: target.into(),
            lines: lines.boxed(),
            status: Box::pin(status),
            collected: String::new(),
        }
    }

    /// Next output line, or `None` once the remote side closed its output.
    pub async fn next_line(&mut self) -> Option<String> {
        let line = self.lines.next().await?;
        self.collected.push_str(&line);
        self.collected.push('\n');
        Some(line)
    }

    /// Drain remaining output, wait for exit, and classify the result.
    pub async fn finish(mut self) -> KubestrapResult<CommandOutput> {
        while self.next_line().await.is_some() {}
        let exit_code = self.status.await?;
        classify(&self.target, exit_code, self.collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KubestrapError;

    fn execution(lines: &[&str], exit_code: i32) -> StreamingExecution {
        let lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        StreamingExecution::new(
            "master",
            futures::stream::iter(lines),
            futures::future::ready(Ok(exit_code)),
        )
    }

    #[tokio::test]
    async fn test_finish_keeps_lines_already_read() {
        let mut exec = execution(&["one", "two", "three"], 0);
        assert_eq!(exec.next_line().await.as_deref(), Some("one"));

        let out = exec.finish().await.unwrap();
        assert_eq!(out.output, "one\ntwo\nthree\n");
        assert_eq!(out.exit_code, 0);
    }

    #[tokio::test]
    async fn test_finish_classifies_non_zero_exit() {
        let err = execution(&["boom"], 2).finish().await.unwrap_err();
        match err {
            KubestrapError::RemoteExecution(e) => {
                assert_eq!(e.target, "master");
                assert_eq!(e.exit_code, 2);
                assert_eq!(e.output, "boom\n");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
