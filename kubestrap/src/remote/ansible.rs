//! Remote runner backed by the `ansible` / `ansible-playbook` binaries.
//!
//! Each call spawns exactly one ansible process. The process is killed if
//! its handle is dropped early and is always reaped before results are
//! returned, so no session outlives the stage that opened it.

use super::{CommandOutput, RemoteRunner, ShellCommand, StreamingExecution, classify};
use crate::constants::transport;
use crate::error::{KubestrapResult, TransportError};
use crate::inventory::HostGroup;
use crate::util::strip_ansi_codes;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Runs commands through ansible against a fixed inventory file.
#[derive(Clone, Debug)]
pub struct AnsibleRunner {
    inventory: PathBuf,
    connect_timeout: Duration,
}

impl AnsibleRunner {
    pub fn new(inventory: impl Into<PathBuf>) -> Self {
        Self {
            inventory: inventory.into(),
            connect_timeout: transport::CONNECT_TIMEOUT,
        }
    }

    /// Override the connection-establishment timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn base_command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.envs(transport::ANSIBLE_ENV.iter().copied())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    /// `ansible <pattern> -i <inventory> -m shell -a <command> --timeout <secs>`
    fn ad_hoc_command(&self, group: &HostGroup, command: &ShellCommand) -> Command {
        let mut cmd = self.base_command(transport::ANSIBLE);
        cmd.arg(group.name())
            .arg("-i")
            .arg(&self.inventory)
            .args(["-m", "shell", "-a"])
            .arg(command.render())
            .arg("--timeout")
            .arg(self.connect_timeout.as_secs().to_string());
        cmd
    }

    /// `ansible-playbook -i <inventory> <playbook> --timeout <secs>`
    fn playbook_command(&self, playbook: &Path) -> Command {
        let mut cmd = self.base_command(transport::ANSIBLE_PLAYBOOK);
        cmd.arg("-i")
            .arg(&self.inventory)
            .arg(playbook)
            .arg("--timeout")
            .arg(self.connect_timeout.as_secs().to_string());
        cmd
    }
}

#[async_trait]
impl RemoteRunner for AnsibleRunner {
    async fn run_playbook(&self, playbook: &Path) -> KubestrapResult<StreamingExecution> {
        tracing::info!(
            playbook = %playbook.display(),
            inventory = %self.inventory.display(),
            "Running playbook"
        );
        spawn_streaming(
            "all",
            transport::ANSIBLE_PLAYBOOK,
            self.playbook_command(playbook),
        )
    }

    async fn execute(
        &self,
        group: &HostGroup,
        command: &ShellCommand,
    ) -> KubestrapResult<CommandOutput> {
        tracing::debug!(target_group = %group.name(), command = %command, "Executing remote command");

        let output = self
            .ad_hoc_command(group, command)
            .output()
            .await
            .map_err(|e| TransportError::launch(transport::ANSIBLE, e))?;

        let mut text = strip_ansi_codes(&String::from_utf8_lossy(&output.stdout));
        text.push_str(&strip_ansi_codes(&String::from_utf8_lossy(&output.stderr)));
        let exit_code = output.status.code().unwrap_or(-1);

        tracing::debug!(target_group = %group.name(), exit_code, "Remote command exited");
        classify(group.name(), exit_code, text)
    }

    async fn execute_streaming(
        &self,
        group: &HostGroup,
        command: &ShellCommand,
    ) -> KubestrapResult<StreamingExecution> {
        tracing::debug!(target_group = %group.name(), command = %command, "Streaming remote command");
        spawn_streaming(
            group.name(),
            transport::ANSIBLE,
            self.ad_hoc_command(group, command),
        )
    }
}

/// Spawn `cmd` with stdout and stderr merged into one line stream.
fn spawn_streaming(
    target: &str,
    program: &'static str,
    mut cmd: Command,
) -> KubestrapResult<StreamingExecution> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .map_err(|e| TransportError::launch(program, e))?;

    let (tx, rx) = mpsc::unbounded_channel();
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_lines(stdout, "stdout", tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_lines(stderr, "stderr", tx));
    }

    let status = async move {
        let status = child
            .wait()
            .await
            .map_err(|e| TransportError::launch(program, e))?;
        Ok(status.code().unwrap_or(-1))
    };

    Ok(StreamingExecution::new(
        target,
        UnboundedReceiverStream::new(rx),
        status,
    ))
}

/// Forward each line of `reader` until EOF or until the receiver is gone.
///
/// Lines are decoded lossily: a byte sequence that is not UTF-8 becomes
/// U+FFFD and reading carries on with the next line.
async fn forward_lines<R>(reader: R, stream_name: &'static str, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(trim_line_ending(&buf));
                if tx.send(strip_ansi_codes(&line)).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(stream = stream_name, "Failed to read from pipe: {}", e);
                break;
            }
        }
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
