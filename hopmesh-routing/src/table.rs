// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Build the per-node routing tables.
//!
//! A routing table lists every node's address range in node ID order. Ranges
//! of nodes within the hop budget of the table's owner map to the node's own
//! port. All other ranges map to the port of a forwarding node.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use hopmesh_track::entity::Entity;
use hopmesh_track::{debug, trace};
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::address_map::{AddressMap, AddressMappingEntry};
use crate::forwarding::{
    ForwardingAssignment, ForwardingStrategy, boundary_ring, closest_to, select_forwarding_ports,
};
use crate::grid::NodeId;
use crate::hops::HopBudget;
use crate::quadrant::{Quadrant, QuadrantPartition};
use crate::sim_error;
use crate::types::{PortId, SimError};

/// How a routing table entry reaches its destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteKind {
    /// The destination is within the hop budget and is accessed directly.
    Direct,

    /// The access is sent to the `via` node which forwards it on.
    ///
    /// `quadrant` is the quadrant of the table owner the forwarding node
    /// serves, when the quadrant strategy chose it.
    Forwarded {
        via: NodeId,
        quadrant: Option<Quadrant>,
    },
}

/// One address range of a [`RoutingTable`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    /// The node that owns the range.
    pub destination: NodeId,
    pub low_addr: u64,
    pub high_addr: u64,
    /// The egress port accesses to this range are sent to.
    pub port: PortId,
    pub kind: RouteKind,
}

impl RouteEntry {
    fn direct(entry: &AddressMappingEntry) -> Self {
        Self {
            destination: entry.node,
            low_addr: entry.low_addr,
            high_addr: entry.high_addr,
            port: entry.port,
            kind: RouteKind::Direct,
        }
    }

    fn forwarded(
        entry: &AddressMappingEntry,
        via: &AddressMappingEntry,
        quadrant: Option<Quadrant>,
    ) -> Self {
        Self {
            destination: entry.node,
            low_addr: entry.low_addr,
            high_addr: entry.high_addr,
            port: via.port,
            kind: RouteKind::Forwarded {
                via: via.node,
                quadrant,
            },
        }
    }

    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        self.low_addr <= addr && addr < self.high_addr
    }

    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.kind == RouteKind::Direct
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{:#x}, {:#x}) node {} -> {}",
            self.low_addr, self.high_addr, self.destination, self.port
        )?;
        match self.kind {
            RouteKind::Direct => write!(f, " direct"),
            RouteKind::Forwarded {
                via,
                quadrant: Some(quadrant),
            } => write!(f, " via node {via} ({quadrant})"),
            RouteKind::Forwarded { via, quadrant: None } => write!(f, " via node {via}"),
        }
    }
}

/// Counts of how the entries of a table are routed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutingSummary {
    pub direct: usize,
    pub forwarded: usize,
    /// Number of forwarded entries sent through each port.
    pub forwarded_by_port: BTreeMap<PortId, usize>,
}

impl fmt::Display for RoutingSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} direct, {} forwarded", self.direct, self.forwarded)?;
        for (port, count) in &self.forwarded_by_port {
            write!(f, ", {port}: {count}")?;
        }
        Ok(())
    }
}

/// The ordered, disjoint address ranges of one node and the port each
/// range is sent to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingTable {
    owner: NodeId,
    entries: Vec<RouteEntry>,
}

impl RoutingTable {
    /// Create a table, checking that the ranges are non-empty, sorted and
    /// do not overlap.
    pub fn new(owner: NodeId, entries: Vec<RouteEntry>) -> Result<Self, SimError> {
        for entry in &entries {
            if entry.low_addr >= entry.high_addr {
                return sim_error!(
                    "Empty address range [{:#x}, {:#x}) for node {} in table of node {owner}",
                    entry.low_addr,
                    entry.high_addr,
                    entry.destination
                );
            }
        }
        for pair in entries.windows(2) {
            if pair[0].high_addr > pair[1].low_addr {
                return sim_error!(
                    "Overlapping address ranges for nodes {} and {} in table of node {owner}",
                    pair[0].destination,
                    pair[1].destination
                );
            }
        }
        Ok(Self { owner, entries })
    }

    #[must_use]
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    #[must_use]
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the entry whose range contains `addr`.
    #[must_use]
    pub fn entry_for(&self, addr: u64) -> Option<&RouteEntry> {
        let index = self.entries.partition_point(|e| e.high_addr <= addr);
        self.entries.get(index).filter(|e| e.contains(addr))
    }

    /// The entry for the range owned by `destination`.
    #[must_use]
    pub fn entry_for_node(&self, destination: NodeId) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.destination == destination)
    }

    #[must_use]
    pub fn summary(&self) -> RoutingSummary {
        let mut summary = RoutingSummary::default();
        for entry in &self.entries {
            match entry.kind {
                RouteKind::Direct => summary.direct += 1,
                RouteKind::Forwarded { .. } => {
                    summary.forwarded += 1;
                    *summary.forwarded_by_port.entry(entry.port).or_default() += 1;
                }
            }
        }
        summary
    }
}

impl fmt::Display for RoutingTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "routing table of node {}:", self.owner)?;
        for entry in &self.entries {
            writeln!(f, "  {entry}")?;
        }
        Ok(())
    }
}

/// Builds one [`RoutingTable`] per node from the global address map.
///
/// Random choices are drawn from a generator seeded with
/// `seed ^ node_id` so that each table only depends on the seed and the
/// node it is built for.
pub struct AddressRangeTableBuilder<'a> {
    entity: Rc<Entity>,
    address_map: &'a AddressMap,
    budget: HopBudget,
    strategy: ForwardingStrategy,
    seed: u64,
}

impl<'a> AddressRangeTableBuilder<'a> {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, address_map: &'a AddressMap, budget: HopBudget) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, "routing")),
            address_map,
            budget,
            strategy: ForwardingStrategy::default(),
            seed: 1,
        }
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: ForwardingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn budget(&self) -> HopBudget {
        self.budget
    }

    /// Build the table used by `node`.
    pub fn build_for(&self, node: NodeId) -> Result<RoutingTable, SimError> {
        let reference = self.address_map.entry(node)?;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed ^ node.0 as u64);

        let entries = match self.strategy {
            ForwardingStrategy::Quadrant => self.quadrant_routes(reference, &mut rng)?,
            ForwardingStrategy::NearestBoundary => {
                self.nearest_boundary_routes(reference, &mut rng)?
            }
        };
        let table = RoutingTable::new(node, entries)?;
        debug!(self.entity ; "node {} at {}: {}", node, reference.coordinate, table.summary());
        Ok(table)
    }

    /// Build the tables of all nodes, in node ID order.
    pub fn build_all(&self) -> Result<Vec<RoutingTable>, SimError> {
        self.address_map
            .topology()
            .node_ids()
            .map(|node| self.build_for(node))
            .collect()
    }

    fn quadrant_routes(
        &self,
        reference: &AddressMappingEntry,
        rng: &mut Xoshiro256PlusPlus,
    ) -> Result<Vec<RouteEntry>, SimError> {
        let entries = self.address_map.entries();
        let partition =
            QuadrantPartition::new(self.address_map.topology(), reference.coordinate, entries);
        let plan = select_forwarding_ports(&partition, self.budget);

        trace!(self.entity ; "node {} layout {:?}", reference.node, partition.layout());
        for assignment in plan.iter() {
            trace!(self.entity ; "node {} forwards {}", reference.node, assignment);
        }

        let mut routes = Vec::with_capacity(entries.len());
        for entry in entries {
            if self.budget.is_within(reference.coordinate, entry.coordinate) {
                routes.push(RouteEntry::direct(entry));
                continue;
            }

            let mut options: Vec<&ForwardingAssignment> = Vec::with_capacity(2);
            for quadrant in partition.quadrants_of(entry.coordinate).iter() {
                match plan.get(quadrant) {
                    Some(assignment) => options.push(assignment),
                    None => {
                        return sim_error!(
                            "Unreachable quadrant {quadrant} of node {} at {}: no forwarding node for node {} at {}",
                            reference.node,
                            reference.coordinate,
                            entry.node,
                            entry.coordinate
                        );
                    }
                }
            }

            let assignment = match options.as_slice() {
                [] => {
                    return sim_error!(
                        "Node {} at {} is in no quadrant of node {} at {}",
                        entry.node,
                        entry.coordinate,
                        reference.node,
                        reference.coordinate
                    );
                }
                [only] => *only,
                _ => options[rng.random_range(0..options.len())],
            };
            let via = self.address_map.entry(assignment.node)?;
            routes.push(RouteEntry::forwarded(entry, via, Some(assignment.quadrant)));
        }
        Ok(routes)
    }

    fn nearest_boundary_routes(
        &self,
        reference: &AddressMappingEntry,
        rng: &mut Xoshiro256PlusPlus,
    ) -> Result<Vec<RouteEntry>, SimError> {
        let entries = self.address_map.entries();
        let ring = boundary_ring(reference.coordinate, entries, self.budget);
        trace!(self.entity ; "node {} has {} boundary nodes", reference.node, ring.len());

        let mut routes = Vec::with_capacity(entries.len());
        for entry in entries {
            if self.budget.is_within(reference.coordinate, entry.coordinate) {
                routes.push(RouteEntry::direct(entry));
                continue;
            }

            let candidates = closest_to(&ring, entry.coordinate);
            let via = match candidates.as_slice() {
                [] => {
                    return sim_error!(
                        "Unreachable node {} at {}: node {} at {} has no boundary nodes",
                        entry.node,
                        entry.coordinate,
                        reference.node,
                        reference.coordinate
                    );
                }
                [only] => *only,
                _ => candidates[rng.random_range(0..candidates.len())],
            };
            routes.push(RouteEntry::forwarded(entry, via, None));
        }
        Ok(routes)
    }
}

#[cfg(test)]
mod tests {
    use hopmesh_track::entity::toplevel;
    use hopmesh_track::tracker::dev_null_tracker;

    use super::*;
    use crate::grid::GridTopology;

    fn map(w: usize, h: usize) -> AddressMap {
        let grid = GridTopology::new(w, h).unwrap();
        AddressMap::new(grid, 0x100, |node, _| Ok(PortId(node.0 as u64))).unwrap()
    }

    #[test]
    fn self_entry_is_direct() {
        let tracker = dev_null_tracker();
        let top = toplevel(&tracker, "top");
        let map = map(3, 3);
        let builder = AddressRangeTableBuilder::new(&top, &map, HopBudget::from_hops(1));

        let table = builder.build_for(NodeId(1)).unwrap();
        let own = table.entry_for_node(NodeId(1)).unwrap();
        assert!(own.is_direct());
        assert_eq!(own.port, PortId(1));
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn summary_counts() {
        let tracker = dev_null_tracker();
        let top = toplevel(&tracker, "top");
        let map = map(3, 3);
        let builder = AddressRangeTableBuilder::new(&top, &map, HopBudget::from_hops(1));

        // From (0,0): itself, (1,0) and (0,1) are direct.
        let summary = builder.build_for(NodeId(1)).unwrap().summary();
        assert_eq!(summary.direct, 3);
        assert_eq!(summary.forwarded, 5);
        assert_eq!(summary.forwarded_by_port.values().sum::<usize>(), 5);
    }

    #[test]
    fn rejects_overlapping_entries() {
        let entry = |destination, low_addr, high_addr| RouteEntry {
            destination: NodeId(destination),
            low_addr,
            high_addr,
            port: PortId(0),
            kind: RouteKind::Direct,
        };
        assert!(RoutingTable::new(NodeId(1), vec![entry(1, 0, 10), entry(2, 5, 20)]).is_err());
        assert!(RoutingTable::new(NodeId(1), vec![entry(1, 10, 10)]).is_err());
        assert!(RoutingTable::new(NodeId(1), vec![entry(1, 0, 10), entry(2, 10, 20)]).is_ok());
    }

    #[test]
    fn lookup_by_address() {
        let tracker = dev_null_tracker();
        let top = toplevel(&tracker, "top");
        let map = map(3, 3);
        let table = AddressRangeTableBuilder::new(&top, &map, HopBudget::from_hops(8))
            .build_for(NodeId(5))
            .unwrap();

        assert!(table.entry_for(0xff).is_none());
        assert_eq!(table.entry_for(0x100).unwrap().destination, NodeId(1));
        assert_eq!(table.entry_for(0x8ff).unwrap().destination, NodeId(8));
        assert!(table.entry_for(0x900).is_none());
    }

    #[test]
    fn display_lists_entries() {
        let tracker = dev_null_tracker();
        let top = toplevel(&tracker, "top");
        let map = map(3, 3);
        let table = AddressRangeTableBuilder::new(&top, &map, HopBudget::from_hops(1))
            .build_for(NodeId(1))
            .unwrap();

        let text = format!("{table}");
        assert!(text.starts_with("routing table of node 1:"));
        assert!(text.contains("[0x100, 0x200) node 1 -> port1 direct"));
        assert!(text.contains("[0x200, 0x300) node 2 -> port2 direct"));
        assert!(text.contains("node 3 -> port2 via node 2 (right)"));
    }
}
