//! Stage 0: host inventory.
//!
//! Derives the host groups from the topology and writes them where the
//! remote runner reads them.

use crate::error::KubestrapResult;
use crate::inventory::{self, HostGroups, InventoryWriter};
use crate::topology::ClusterTopology;

/// Build the groups and persist them, replacing any previous inventory.
pub fn run(topology: &ClusterTopology, writer: &dyn InventoryWriter) -> KubestrapResult<HostGroups> {
    let groups = inventory::build(topology)?;
    writer.write(&groups)?;
    Ok(groups)
}
