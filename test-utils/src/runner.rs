use async_trait::async_trait;
use futures::{future, stream};
use kubestrap::error::{KubestrapResult, TransportError};
use kubestrap::inventory::HostGroup;
use kubestrap::remote::{CommandOutput, RemoteRunner, ShellCommand, StreamingExecution, classify};
use parking_lot::Mutex;
use std::io;
use std::path::Path;

/// Which runner entry point was called.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Playbook,
    Execute,
    Streaming,
}

/// One recorded call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub kind: CallKind,
    /// Group name, or `"all"` for playbooks.
    pub target: String,
    /// Rendered command, or the playbook path.
    pub command: String,
}

/// What a scripted call answers with.
#[derive(Clone, Debug)]
pub enum Reply {
    /// Process exited with `code` after printing `output`.
    Exit { code: i32, output: String },
    /// Host unreachable, as the transport reports it.
    Unreachable,
    /// Host rejected the credential.
    AuthRejected,
    /// The transport binary could not be started.
    LaunchFailure,
}

impl Reply {
    pub fn ok(output: impl Into<String>) -> Self {
        Reply::Exit {
            code: 0,
            output: output.into(),
        }
    }

    pub fn fail(code: i32, output: impl Into<String>) -> Self {
        Reply::Exit {
            code,
            output: output.into(),
        }
    }

    /// Exit code and output as the transport would report them.
    fn as_exit(&self, target: &str) -> (i32, String) {
        match self {
            Reply::Exit { code, output } => (*code, output.clone()),
            Reply::Unreachable => (
                4,
                format!("{target} | UNREACHABLE! => {{\"msg\": \"Connection timed out\"}}"),
            ),
            Reply::AuthRejected => (
                4,
                format!("{target} | UNREACHABLE! => {{\"msg\": \"Invalid/incorrect password\"}}"),
            ),
            Reply::LaunchFailure => (-1, String::new()),
        }
    }
}

struct Rule {
    matches: Box<dyn Fn(&Invocation) -> bool + Send + Sync>,
    reply: Reply,
}

/// Runner that answers from a script instead of touching any host.
///
/// Rules are checked in the order they were added; the first match wins.
/// Unmatched calls succeed with empty output.
///
/// ```ignore
/// let runner = ScriptedRunner::new()
///     .on_command("kubeadm init", Reply::ok(fixtures::kubeadm_init_output("10.0.0.1")))
///     .on_target("10.0.0.12", Reply::fail(1, "preflight failed"));
/// ```
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to calls whose rendered command contains `pattern`.
    pub fn on_command(self, pattern: &str, reply: Reply) -> Self {
        let pattern = pattern.to_string();
        self.on(move |call| call.command.contains(&pattern), reply)
    }

    /// Reply to calls aimed at `target`.
    pub fn on_target(self, target: &str, reply: Reply) -> Self {
        let target = target.to_string();
        self.on(move |call| call.target == target, reply)
    }

    /// Reply to playbook runs.
    pub fn on_playbook(self, reply: Reply) -> Self {
        self.on(|call| call.kind == CallKind::Playbook, reply)
    }

    pub fn on<F>(mut self, matches: F, reply: Reply) -> Self
    where
        F: Fn(&Invocation) -> bool + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            matches: Box::new(matches),
            reply,
        });
        self
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }

    /// Calls whose command contains `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> Vec<Invocation> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.command.contains(pattern))
            .cloned()
            .collect()
    }

    fn record(&self, kind: CallKind, target: &str, command: String) -> (Invocation, Reply) {
        let call = Invocation {
            kind,
            target: target.to_string(),
            command,
        };
        let reply = self
            .rules
            .iter()
            .find(|rule| (rule.matches)(&call))
            .map(|rule| rule.reply.clone())
            .unwrap_or_else(|| Reply::ok(""));
        self.calls.lock().push(call.clone());
        (call, reply)
    }

    fn streaming(call: &Invocation, reply: &Reply) -> KubestrapResult<StreamingExecution> {
        if let Reply::LaunchFailure = reply {
            return Err(launch_failure().into());
        }
        let (code, output) = reply.as_exit(&call.target);
        let lines: Vec<String> = output.lines().map(str::to_string).collect();
        Ok(StreamingExecution::new(
            call.target.clone(),
            stream::iter(lines),
            future::ready(Ok(code)),
        ))
    }
}

fn launch_failure() -> TransportError {
    TransportError::launch(
        "ansible",
        io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
    )
}

#[async_trait]
impl RemoteRunner for ScriptedRunner {
    async fn run_playbook(&self, playbook: &Path) -> KubestrapResult<StreamingExecution> {
        let (call, reply) = self.record(
            CallKind::Playbook,
            "all",
            playbook.display().to_string(),
        );
        Self::streaming(&call, &reply)
    }

    async fn execute(
        &self,
        group: &HostGroup,
        command: &ShellCommand,
    ) -> KubestrapResult<CommandOutput> {
        let (call, reply) = self.record(CallKind::Execute, group.name(), command.render());
        if let Reply::LaunchFailure = reply {
            return Err(launch_failure().into());
        }
        let (code, output) = reply.as_exit(&call.target);
        classify(&call.target, code, output)
    }

    async fn execute_streaming(
        &self,
        group: &HostGroup,
        command: &ShellCommand,
    ) -> KubestrapResult<StreamingExecution> {
        let (call, reply) = self.record(CallKind::Streaming, group.name(), command.render());
        Self::streaming(&call, &reply)
    }
}
