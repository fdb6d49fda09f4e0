// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Choose the nodes that forward accesses which are beyond the hop budget.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address_map::AddressMappingEntry;
use crate::grid::{Coordinate, NodeId};
use crate::hops::{HopBudget, distance};
use crate::quadrant::{Quadrant, QuadrantPartition, QuadrantSet};
use crate::types::PortId;

/// How an out-of-budget destination is mapped to a forwarding node.
#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, Serialize, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForwardingStrategy {
    #[default]
    /// One forwarding node per quadrant of the source node
    Quadrant,

    /// Per destination, the boundary node closest to it
    NearestBoundary,
}

impl fmt::Display for ForwardingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ForwardingStrategy::Quadrant => write!(f, "quadrant"),
            ForwardingStrategy::NearestBoundary => write!(f, "nearest-boundary"),
        }
    }
}

/// The node chosen to forward traffic heading into one quadrant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwardingAssignment {
    pub quadrant: Quadrant,
    pub node: NodeId,
    pub coordinate: Coordinate,
    pub port: PortId,
    /// Distance from the reference node to the forwarding node.
    pub hops: usize,
}

impl fmt::Display for ForwardingAssignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: node {} at {} via {} ({} hops)",
            self.quadrant, self.node, self.coordinate, self.port, self.hops
        )
    }
}

/// The forwarding node chosen for each quadrant that has one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForwardingPlan {
    assignments: Vec<ForwardingAssignment>,
}

impl ForwardingPlan {
    #[must_use]
    pub fn get(&self, quadrant: Quadrant) -> Option<&ForwardingAssignment> {
        self.assignments.iter().find(|a| a.quadrant == quadrant)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForwardingAssignment> {
        self.assignments.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    #[must_use]
    pub fn quadrants(&self) -> QuadrantSet {
        self.assignments.iter().map(|a| a.quadrant).collect()
    }
}

/// Pick one forwarding node for every non-empty quadrant of the partition.
///
/// Quadrants are visited in [`Quadrant::ALL`] order. Each takes the first
/// node (in scan order) that sits exactly on the hop budget and has not
/// already been picked by an earlier quadrant. A diagonal boundary node can
/// only be shared once every other boundary node of the quadrant is taken.
///
/// When a quadrant has no node on the boundary, which happens when the grid
/// edge is closer than the budget in that direction, its nearest node beyond
/// the budget is used instead. A quadrant whose members are all within the
/// budget gets no forwarding node.
#[must_use]
pub fn select_forwarding_ports(
    partition: &QuadrantPartition,
    budget: HopBudget,
) -> ForwardingPlan {
    let reference = partition.reference();
    let mut chosen: Vec<NodeId> = Vec::new();
    let mut plan = ForwardingPlan::default();

    for quadrant in Quadrant::ALL {
        let members = partition.members(quadrant);
        let boundary: Vec<&AddressMappingEntry> = members
            .iter()
            .copied()
            .filter(|e| budget.is_on_boundary(reference, e.coordinate))
            .collect();
        let candidates = if boundary.is_empty() {
            nearest_beyond(reference, members, budget)
        } else {
            boundary
        };

        let Some(selected) = first_unchosen(&candidates, &chosen) else {
            continue;
        };
        chosen.push(selected.node);
        plan.assignments.push(ForwardingAssignment {
            quadrant,
            node: selected.node,
            coordinate: selected.coordinate,
            port: selected.port,
            hops: distance(reference, selected.coordinate),
        });
    }
    plan
}

fn nearest_beyond<'a>(
    reference: Coordinate,
    members: &[&'a AddressMappingEntry],
    budget: HopBudget,
) -> Vec<&'a AddressMappingEntry> {
    let beyond = members
        .iter()
        .copied()
        .filter(|e| !budget.is_within(reference, e.coordinate));
    let Some(nearest) = beyond
        .clone()
        .map(|e| distance(reference, e.coordinate))
        .min()
    else {
        return Vec::new();
    };
    beyond
        .filter(|e| distance(reference, e.coordinate) == nearest)
        .collect()
}

fn first_unchosen<'a>(
    candidates: &[&'a AddressMappingEntry],
    chosen: &[NodeId],
) -> Option<&'a AddressMappingEntry> {
    candidates
        .iter()
        .find(|e| !chosen.contains(&e.node))
        .or_else(|| candidates.first())
        .copied()
}

/// The ring of nodes a source forwards through under
/// [`ForwardingStrategy::NearestBoundary`].
///
/// This is every node exactly on the hop budget. If there are none, the
/// closest non-empty ring beyond the budget is used.
#[must_use]
pub fn boundary_ring<'a>(
    reference: Coordinate,
    entries: &'a [AddressMappingEntry],
    budget: HopBudget,
) -> Vec<&'a AddressMappingEntry> {
    let others: Vec<&AddressMappingEntry> = entries
        .iter()
        .filter(|e| e.coordinate != reference)
        .collect();
    let ring: Vec<&AddressMappingEntry> = others
        .iter()
        .copied()
        .filter(|e| budget.is_on_boundary(reference, e.coordinate))
        .collect();
    if ring.is_empty() {
        nearest_beyond(reference, &others, budget)
    } else {
        ring
    }
}

/// The members of `ring` closest to `destination`.
#[must_use]
pub fn closest_to<'a>(
    ring: &[&'a AddressMappingEntry],
    destination: Coordinate,
) -> Vec<&'a AddressMappingEntry> {
    let Some(nearest) = ring
        .iter()
        .map(|e| distance(e.coordinate, destination))
        .min()
    else {
        return Vec::new();
    };
    ring.iter()
        .copied()
        .filter(|e| distance(e.coordinate, destination) == nearest)
        .collect()
}
