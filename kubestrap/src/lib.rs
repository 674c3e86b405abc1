//! kubestrap: bootstrap a Kubernetes cluster on bare hosts.
//!
//! One control-plane host and zero or more workers are driven through a
//! fixed sequence of stages: host inventory, environment preparation,
//! control-plane init, join-command extraction, kubeconfig setup, worker
//! enrollment and overlay-network install. Remote work goes through the
//! configuration-management tool (see [`remote::AnsibleRunner`]).
//!
//! ```ignore
//! let config = BootstrapConfig::load(Path::new("config.yaml"))?;
//! let topology = config.topology()?;
//! let runner = AnsibleRunner::new(&config.inventory_path);
//! let writer = FileInventoryWriter::new(&config.inventory_path);
//!
//! Orchestrator::new(&config, &topology, &runner, &writer).run().await?;
//! ```

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error;
pub mod inventory;
pub mod remote;
pub mod token;
pub mod topology;
pub mod util;

pub use bootstrap::{BootstrapState, NoProgress, Orchestrator, Progress, RunReport, Stage};
pub use config::{BootstrapConfig, ClusterSettings};
pub use error::{KubestrapError, KubestrapResult};
pub use inventory::{FileInventoryWriter, HostGroup, HostGroups, InventoryWriter};
pub use remote::{AnsibleRunner, RemoteRunner};
pub use token::EnrollmentToken;
pub use topology::ClusterTopology;
