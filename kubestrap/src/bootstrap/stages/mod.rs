//! Bootstrap stages.
//!
//! Each stage is a function with typed input/output. Stages never decide
//! whether their own failure is fatal; they return the error and the
//! orchestrator applies [`Stage::policy`](super::Stage::policy).
//!
//! ```text
//! inventory ──→ prepare ──→ reset* ──→ master_init ──→ extract
//!           ──→ kubeconfig ──→ join (per worker) ──→ network
//!
//! * advisory sub-step of MasterInit
//! ```

pub mod extract;
pub mod inventory;
pub mod join;
pub mod kubeconfig;
pub mod master_init;
pub mod network;
pub mod prepare;
pub mod reset;

use crate::config::BootstrapConfig;
use crate::inventory::HostGroups;
use crate::remote::RemoteRunner;

/// Shared, read-only input for the remote stages.
pub struct StageInput<'a> {
    pub config: &'a BootstrapConfig,
    pub runner: &'a dyn RemoteRunner,
    pub groups: &'a HostGroups,
}
