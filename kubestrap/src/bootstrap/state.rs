//! Bootstrap stages, run state machine, and per-stage failure policy.
//!
//! ```text
//! Idle → Preparing → MasterInit → TokenExtracted → KubeconfigReady
//!      → WorkersJoined → NetworkInstalled → Done
//!
//! any non-terminal state ──(fatal failure)──→ Failed(stage)
//! ```
//!
//! A non-terminal state names the work being done while in it: in
//! `KubeconfigReady` the kubeconfig is being installed, in `WorkersJoined`
//! workers are being joined, and so on.

use std::fmt;

/// What the orchestrator does when a stage fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePolicy {
    /// Stop the run; the state becomes `Failed(stage)`.
    Fatal,
    /// Log a warning and move on to the next stage.
    Advisory,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Fatal => "fatal",
            FailurePolicy::Advisory => "advisory",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy for the reset of earlier failed runs that precedes `kubeadm init`.
pub const RESET_POLICY: FailurePolicy = FailurePolicy::Advisory;

/// A non-terminal bootstrap state, i.e. a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Build and write the host inventory.
    Idle,
    /// Environment preparation playbook.
    Preparing,
    /// Reset leftovers, then `kubeadm init` on the control plane.
    MasterInit,
    /// Pull the join command out of the init output.
    TokenExtracted,
    /// Install the admin kubeconfig for the login user.
    KubeconfigReady,
    /// Join workers one at a time.
    WorkersJoined,
    /// Apply the overlay-network manifest.
    NetworkInstalled,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Stage; 7] = [
        Stage::Idle,
        Stage::Preparing,
        Stage::MasterInit,
        Stage::TokenExtracted,
        Stage::KubeconfigReady,
        Stage::WorkersJoined,
        Stage::NetworkInstalled,
    ];

    /// Failure policy table.
    pub fn policy(&self) -> FailurePolicy {
        match self {
            Stage::KubeconfigReady => FailurePolicy::Advisory,
            Stage::Idle
            | Stage::Preparing
            | Stage::MasterInit
            | Stage::TokenExtracted
            | Stage::WorkersJoined
            | Stage::NetworkInstalled => FailurePolicy::Fatal,
        }
    }

    /// State entered when this stage completes (or fails advisorily).
    pub fn next(&self) -> BootstrapState {
        match self {
            Stage::Idle => BootstrapState::Preparing,
            Stage::Preparing => BootstrapState::MasterInit,
            Stage::MasterInit => BootstrapState::TokenExtracted,
            Stage::TokenExtracted => BootstrapState::KubeconfigReady,
            Stage::KubeconfigReady => BootstrapState::WorkersJoined,
            Stage::WorkersJoined => BootstrapState::NetworkInstalled,
            Stage::NetworkInstalled => BootstrapState::Done,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Preparing => "preparing",
            Stage::MasterInit => "master-init",
            Stage::TokenExtracted => "token-extracted",
            Stage::KubeconfigReady => "kubeconfig-ready",
            Stage::WorkersJoined => "workers-joined",
            Stage::NetworkInstalled => "network-installed",
        }
    }

    /// Operator-facing description.
    pub fn description(&self) -> &'static str {
        match self {
            Stage::Idle => "Generating host inventory",
            Stage::Preparing => "Preparing hosts and distributing offline images",
            Stage::MasterInit => "Initializing control plane",
            Stage::TokenExtracted => "Extracting worker join command",
            Stage::KubeconfigReady => "Configuring kubectl access",
            Stage::WorkersJoined => "Joining worker nodes",
            Stage::NetworkInstalled => "Installing overlay network",
        }
    }

    /// `n/5` position among the remote stages, if this is one of them.
    pub fn step(&self) -> Option<(u8, u8)> {
        let n = match self {
            Stage::Preparing => 1,
            Stage::MasterInit => 2,
            Stage::KubeconfigReady => 3,
            Stage::WorkersJoined => 4,
            Stage::NetworkInstalled => 5,
            Stage::Idle | Stage::TokenExtracted => return None,
        };
        Some((n, 5))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapState {
    Idle,
    Preparing,
    MasterInit,
    TokenExtracted,
    KubeconfigReady,
    WorkersJoined,
    NetworkInstalled,
    Done,
    Failed(Stage),
}

impl BootstrapState {
    /// The stage to execute in this state; `None` once terminal.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            BootstrapState::Idle => Some(Stage::Idle),
            BootstrapState::Preparing => Some(Stage::Preparing),
            BootstrapState::MasterInit => Some(Stage::MasterInit),
            BootstrapState::TokenExtracted => Some(Stage::TokenExtracted),
            BootstrapState::KubeconfigReady => Some(Stage::KubeconfigReady),
            BootstrapState::WorkersJoined => Some(Stage::WorkersJoined),
            BootstrapState::NetworkInstalled => Some(Stage::NetworkInstalled),
            BootstrapState::Done | BootstrapState::Failed(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.stage().is_none()
    }

    pub fn is_done(&self) -> bool {
        matches!(self, BootstrapState::Done)
    }

    /// Check if transition to target state is valid.
    pub fn can_transition_to(&self, target: BootstrapState) -> bool {
        match self.stage() {
            Some(stage) => target == stage.next() || target == BootstrapState::Failed(stage),
            None => false,
        }
    }
}

impl From<Stage> for BootstrapState {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Idle => BootstrapState::Idle,
            Stage::Preparing => BootstrapState::Preparing,
            Stage::MasterInit => BootstrapState::MasterInit,
            Stage::TokenExtracted => BootstrapState::TokenExtracted,
            Stage::KubeconfigReady => BootstrapState::KubeconfigReady,
            Stage::WorkersJoined => BootstrapState::WorkersJoined,
            Stage::NetworkInstalled => BootstrapState::NetworkInstalled,
        }
    }
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapState::Done => f.write_str("done"),
            BootstrapState::Failed(stage) => write!(f, "failed({})", stage),
            other => match other.stage() {
                Some(stage) => f.write_str(stage.as_str()),
                None => Ok(()),
            },
        }
    }
}
