//! Host inventory.
//!
//! [`build`] turns a [`ClusterTopology`] into the two host groups the
//! remote runner targets; [`writer`] persists them as an INI inventory
//! for the configuration-management tool.

pub mod writer;

pub use writer::{FileInventoryWriter, InventoryWriter, render_ini};

use crate::constants::groups;
use crate::error::KubestrapResult;
use crate::topology::ClusterTopology;
use std::fmt;

/// One target machine plus the credentials used to reach it.
#[derive(Clone, PartialEq, Eq)]
pub struct Host {
    pub address: String,
    pub login_user: String,
    pub login_secret: String,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("address", &self.address)
            .field("login_user", &self.login_user)
            .finish_non_exhaustive()
    }
}

/// A named set of hosts a single remote command is scoped to.
///
/// The name is what the transport uses as its target pattern: an inventory
/// group name, or a bare address for single-host groups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostGroup {
    name: String,
    members: Vec<Host>,
}

impl HostGroup {
    pub fn new(name: impl Into<String>, members: Vec<Host>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    /// Group containing exactly one host, named after its address.
    pub fn single(host: Host) -> Self {
        Self {
            name: host.address.clone(),
            members: vec![host],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Host] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Per-host groups, in member order.
    pub fn split(&self) -> impl Iterator<Item = HostGroup> + '_ {
        self.members.iter().cloned().map(HostGroup::single)
    }
}

/// The complete inventory: control plane first, then workers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostGroups {
    pub control_plane: HostGroup,
    pub workers: HostGroup,
}

impl HostGroups {
    /// Groups in inventory order.
    pub fn iter(&self) -> impl Iterator<Item = &HostGroup> {
        [&self.control_plane, &self.workers].into_iter()
    }
}

/// Derive host groups from a topology.
///
/// Deterministic: the same topology always yields the same groups in the
/// same order. Fails with `InvalidTopology` if the topology's invariants
/// don't hold.
pub fn build(topology: &ClusterTopology) -> KubestrapResult<HostGroups> {
    topology.validate()?;

    let host = |address: &str| Host {
        address: address.to_string(),
        login_user: topology.login_user().to_string(),
        login_secret: topology.login_secret().to_string(),
    };

    let groups = HostGroups {
        control_plane: HostGroup::new(groups::CONTROL_PLANE, vec![host(topology.control_plane())]),
        workers: HostGroup::new(
            groups::WORKERS,
            topology.workers().iter().map(|w| host(w)).collect(),
        ),
    };

    tracing::debug!(
        control_plane = %topology.control_plane(),
        workers = groups.workers.len(),
        "Built host groups"
    );

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology() -> ClusterTopology {
        ClusterTopology::new("10.0.0.1", ["10.0.0.2", "10.0.0.3"], "root", "pw").unwrap()
    }

    #[test]
    fn test_build_groups_in_order() {
        let groups = build(&topology()).unwrap();

        assert_eq!(groups.control_plane.name(), "master");
        assert_eq!(groups.control_plane.len(), 1);
        assert_eq!(groups.control_plane.members()[0].address, "10.0.0.1");

        let workers: Vec<_> = groups.workers.members().iter().map(|h| h.address.as_str()).collect();
        assert_eq!(groups.workers.name(), "nodes");
        assert_eq!(workers, ["10.0.0.2", "10.0.0.3"]);

        let names: Vec<_> = groups.iter().map(HostGroup::name).collect();
        assert_eq!(names, ["master", "nodes"]);
    }

    #[test]
    fn test_build_is_idempotent() {
        let t = topology();
        assert_eq!(build(&t).unwrap(), build(&t).unwrap());
    }

    #[test]
    fn test_split_names_groups_by_address() {
        let groups = build(&topology()).unwrap();
        let singles: Vec<_> = groups.workers.split().collect();

        assert_eq!(singles.len(), 2);
        assert_eq!(singles[1].name(), "10.0.0.3");
        assert_eq!(singles[1].members()[0].login_user, "root");
    }

    #[test]
    fn test_host_debug_hides_secret() {
        let groups = build(&topology()).unwrap();
        assert!(!format!("{:?}", groups).contains("pw"));
    }
}
