// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::collections::BTreeSet;
use std::rc::Rc;

use hopmesh_routing::address_map::AddressMap;
use hopmesh_routing::forwarding::ForwardingStrategy;
use hopmesh_routing::grid::GridTopology;
use hopmesh_routing::hops::HopBudget;
use hopmesh_routing::table::{AddressRangeTableBuilder, RouteKind};
use hopmesh_routing::types::{PortId, SimError, SimResult};
use hopmesh_track::connect;
use hopmesh_track::entity::Entity;

use crate::Nodes;
use crate::rdma::RdmaEngine;

/// The mesh configuration once all defaults have been applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeshConfig {
    pub name: String,
    pub budget: HopBudget,
    pub node_memory_bytes: u64,
    pub forwarding: ForwardingStrategy,
    pub seed: u64,
    pub port_name: String,
}

/// Create one engine per node with its egress port registered.
pub fn build_nodes(
    parent: &Rc<Entity>,
    topology: &GridTopology,
    config: &MeshConfig,
) -> Result<Nodes, SimError> {
    let mut nodes = Vec::with_capacity(topology.num_nodes());
    for (i, coordinate) in topology.coordinates().enumerate() {
        let node = topology.node_id_of(coordinate)?;
        let engine = RdmaEngine::new(parent, node, coordinate);
        engine.register_port(&config.port_name, PortId(i as u64))?;
        nodes.push(Rc::new(engine));
    }
    Ok(nodes)
}

/// Collect the address range and egress port of every node.
pub fn build_address_map(
    topology: &GridTopology,
    nodes: &[Rc<RdmaEngine>],
    config: &MeshConfig,
) -> Result<AddressMap, SimError> {
    AddressMap::new(topology.clone(), config.node_memory_bytes, |node, _| {
        match node.0.checked_sub(1).and_then(|i| nodes.get(i)) {
            Some(engine) => engine.port_by_name(&config.port_name),
            None => Err(SimError(format!("Unknown node {node}: no engine built"))),
        }
    })
}

/// Build a routing table for each node and hand it to the node's engine.
pub fn build_routing_tables(
    parent: &Rc<Entity>,
    address_map: &AddressMap,
    nodes: &[Rc<RdmaEngine>],
    config: &MeshConfig,
) -> SimResult {
    let builder = AddressRangeTableBuilder::new(parent, address_map, config.budget)
        .with_strategy(config.forwarding)
        .with_seed(config.seed);

    for engine in nodes {
        let table = builder.build_for(engine.node())?;

        let forwarders: BTreeSet<usize> = table
            .entries()
            .iter()
            .filter_map(|entry| match entry.kind {
                RouteKind::Forwarded { via, .. } => Some(via.0),
                RouteKind::Direct => None,
            })
            .collect();
        for via in forwarders {
            if let Some(forwarder) = via.checked_sub(1).and_then(|i| nodes.get(i)) {
                connect!(engine.entity() ; forwarder.entity());
            }
        }

        engine.set_remote_routing_table(table)?;
    }
    Ok(())
}
