//! Shared test doubles and fixtures for kubestrap.
//!
//! - [`ScriptedRunner`]: a [`RemoteRunner`] that replays scripted replies
//!   and records every invocation
//! - [`MemoryInventory`]: an [`InventoryWriter`] that keeps the rendered
//!   inventory in memory
//! - [`RecordingProgress`]: a [`Progress`] that records events
//! - fixtures for config files and `kubeadm init` output

pub mod fixtures;
mod progress;
mod runner;

pub use progress::RecordingProgress;
pub use runner::{CallKind, Invocation, Reply, ScriptedRunner};

use kubestrap::error::{ConfigError, KubestrapResult};
use kubestrap::inventory::{HostGroups, InventoryWriter, render_ini};
use parking_lot::Mutex;
use std::io;
use std::path::PathBuf;

/// Inventory writer that keeps every write in memory.
#[derive(Debug, Default)]
pub struct MemoryInventory {
    writes: Mutex<Vec<String>>,
    fail: bool,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer whose every write fails with `InventoryWrite`.
    pub fn failing() -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Most recently written inventory text.
    pub fn last(&self) -> Option<String> {
        self.writes.lock().last().cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().len()
    }
}

impl InventoryWriter for MemoryInventory {
    fn write(&self, groups: &HostGroups) -> KubestrapResult<()> {
        if self.fail {
            return Err(ConfigError::InventoryWrite {
                path: PathBuf::from("<memory>"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            }
            .into());
        }
        self.writes.lock().push(render_ini(groups));
        Ok(())
    }
}
