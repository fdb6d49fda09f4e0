// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The global address map of a mesh.
//!
//! Each node owns one contiguous range of the global address space. Node `id`
//! owns `[id * node_memory_bytes, (id + 1) * node_memory_bytes)`. The range
//! below the first node belongs to the controller and is never routed.

use crate::grid::{Coordinate, GridTopology, NodeId};
use crate::sim_error;
use crate::types::{PortId, SimError};

/// Default amount of memory each node exposes (4 GiB).
pub const DEFAULT_NODE_MEMORY_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// The address range owned by one node along with its own egress port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressMappingEntry {
    pub node: NodeId,
    pub coordinate: Coordinate,
    /// Inclusive lower bound.
    pub low_addr: u64,
    /// Exclusive upper bound.
    pub high_addr: u64,
    pub port: PortId,
}

impl AddressMappingEntry {
    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        self.low_addr <= addr && addr < self.high_addr
    }
}

/// Read-only snapshot of every node's address range, in node ID order.
#[derive(Clone, Debug)]
pub struct AddressMap {
    topology: GridTopology,
    node_memory_bytes: u64,
    entries: Vec<AddressMappingEntry>,
}

impl AddressMap {
    /// Build the map for `topology`.
    ///
    /// `port_of` is asked for the egress port of each node in turn.
    pub fn new<F>(
        topology: GridTopology,
        node_memory_bytes: u64,
        mut port_of: F,
    ) -> Result<Self, SimError>
    where
        F: FnMut(NodeId, Coordinate) -> Result<PortId, SimError>,
    {
        if node_memory_bytes == 0 {
            return sim_error!("Invalid node memory size: must be > 0 bytes");
        }

        let mut entries = Vec::with_capacity(topology.num_nodes());
        for coordinate in topology.coordinates() {
            let node = topology.node_id_of(coordinate)?;
            let Some((low_addr, high_addr)) = address_range(node, node_memory_bytes) else {
                return sim_error!(
                    "Address space overflow: node {node} with {node_memory_bytes} bytes per node"
                );
            };
            entries.push(AddressMappingEntry {
                node,
                coordinate,
                low_addr,
                high_addr,
                port: port_of(node, coordinate)?,
            });
        }

        Ok(Self {
            topology,
            node_memory_bytes,
            entries,
        })
    }

    #[must_use]
    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    #[must_use]
    pub fn node_memory_bytes(&self) -> u64 {
        self.node_memory_bytes
    }

    #[must_use]
    pub fn entries(&self) -> &[AddressMappingEntry] {
        &self.entries
    }

    /// Look up the entry for `node`.
    pub fn entry(&self, node: NodeId) -> Result<&AddressMappingEntry, SimError> {
        match node.0.checked_sub(1).and_then(|i| self.entries.get(i)) {
            Some(entry) => Ok(entry),
            None => sim_error!("Unknown node {node} in address map"),
        }
    }

    /// Find the entry whose range contains `addr`.
    #[must_use]
    pub fn owner_of(&self, addr: u64) -> Option<&AddressMappingEntry> {
        let index = self.entries.partition_point(|e| e.high_addr <= addr);
        self.entries.get(index).filter(|e| e.contains(addr))
    }
}

fn address_range(node: NodeId, node_memory_bytes: u64) -> Option<(u64, u64)> {
    let low = u64::try_from(node.0).ok()?.checked_mul(node_memory_bytes)?;
    let high = low.checked_add(node_memory_bytes)?;
    Some((low, high))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port_per_node(node: NodeId, _: Coordinate) -> Result<PortId, SimError> {
        Ok(PortId(node.0 as u64 * 10))
    }

    #[test]
    fn ranges_follow_node_ids() {
        let grid = GridTopology::new(3, 3).unwrap();
        let map = AddressMap::new(grid, DEFAULT_NODE_MEMORY_BYTES, port_per_node).unwrap();

        assert_eq!(map.entries().len(), 8);
        let first = map.entry(NodeId(1)).unwrap();
        assert_eq!(first.coordinate, Coordinate::new(0, 0));
        assert_eq!(first.low_addr, DEFAULT_NODE_MEMORY_BYTES);
        assert_eq!(first.high_addr, 2 * DEFAULT_NODE_MEMORY_BYTES);
        assert_eq!(first.port, PortId(10));

        for pair in map.entries().windows(2) {
            assert_eq!(pair[0].high_addr, pair[1].low_addr);
        }
    }

    #[test]
    fn owner_lookup() {
        let grid = GridTopology::new(3, 3).unwrap();
        let map = AddressMap::new(grid, 0x1000, port_per_node).unwrap();

        assert!(map.owner_of(0).is_none());
        assert!(map.owner_of(0xfff).is_none());
        assert_eq!(map.owner_of(0x1000).unwrap().node, NodeId(1));
        assert_eq!(map.owner_of(0x4abc).unwrap().node, NodeId(4));
        assert_eq!(map.owner_of(0x8fff).unwrap().node, NodeId(8));
        assert!(map.owner_of(0x9000).is_none());
    }

    #[test]
    fn rejects_zero_memory() {
        let grid = GridTopology::new(3, 3).unwrap();
        assert!(AddressMap::new(grid, 0, port_per_node).is_err());
    }

    #[test]
    fn rejects_overflow() {
        let grid = GridTopology::new(3, 3).unwrap();
        assert!(AddressMap::new(grid, u64::MAX / 4, port_per_node).is_err());
    }

    #[test]
    fn port_errors_propagate() {
        let grid = GridTopology::new(3, 3).unwrap();
        let result = AddressMap::new(grid, 0x1000, |node, _| {
            if node == NodeId(3) {
                sim_error!("No port for node {node}")
            } else {
                Ok(PortId(0))
            }
        });
        assert_eq!(
            result.unwrap_err(),
            SimError("No port for node 3".to_string())
        );
    }
}
