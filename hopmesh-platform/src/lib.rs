// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Build a mesh platform from a configuration file.
//!
//! The platform creates a remote-access engine for every node of the mesh
//! and gives each one the routing table that decides which port an
//! outgoing remote access leaves through.

use std::fmt::Display;
use std::path::Path;
use std::rc::Rc;

use hopmesh_routing::address_map::{AddressMap, DEFAULT_NODE_MEMORY_BYTES};
use hopmesh_routing::grid::{Coordinate, GridTopology, NodeId};
use hopmesh_routing::hops::HopBudget;
use hopmesh_routing::sim_error;
use hopmesh_routing::types::SimError;
use hopmesh_track::entity::Entity;
use hopmesh_track::info;

use crate::builder::{MeshConfig, build_address_map, build_nodes, build_routing_tables};
use crate::rdma::RdmaEngine;
use crate::types::{MeshSection, PlatformConfig};

pub mod builder;
pub mod rdma;
pub mod types;

type Nodes = Vec<Rc<RdmaEngine>>;

const DEFAULT_NAME: &str = "mesh";
const DEFAULT_SEED: u64 = 1;
const DEFAULT_PORT_NAME: &str = "ToOutside";

pub struct MeshPlatform {
    entity: Rc<Entity>,
    config: MeshConfig,
    address_map: AddressMap,
    nodes: Nodes,
}

impl MeshPlatform {
    pub fn from_file(parent: &Rc<Entity>, platform_path: &Path) -> Result<Self, SimError> {
        let s = std::fs::read_to_string(platform_path)
            .map_err(|e| SimError(format!("Unable to read {}: {e}", platform_path.display())))?;
        MeshPlatform::from_string(parent, &s)
    }

    pub fn from_string(parent: &Rc<Entity>, platform_config: &str) -> Result<Self, SimError> {
        let cfg: PlatformConfig = serde_yaml::from_str(platform_config)
            .map_err(|e| SimError(format!("serde_yaml::from_str failed: {e}")))?;
        MeshPlatform::build(parent, &cfg.mesh)
    }

    pub fn build(parent: &Rc<Entity>, cfg: &MeshSection) -> Result<Self, SimError> {
        let topology = GridTopology::new(cfg.columns, cfg.rows)?;
        let config = MeshConfig {
            name: cfg.name.clone().unwrap_or_else(|| DEFAULT_NAME.to_string()),
            budget: HopBudget::new(cfg.max_num_hops)?,
            node_memory_bytes: cfg.node_memory_bytes.unwrap_or(DEFAULT_NODE_MEMORY_BYTES),
            forwarding: cfg.forwarding.unwrap_or_default(),
            seed: cfg.seed.unwrap_or(DEFAULT_SEED),
            port_name: cfg
                .port_name
                .clone()
                .unwrap_or_else(|| DEFAULT_PORT_NAME.to_string()),
        };

        let entity = Rc::new(Entity::new(parent, &config.name));
        let nodes = build_nodes(&entity, &topology, &config)?;
        let address_map = build_address_map(&topology, &nodes, &config)?;
        build_routing_tables(&entity, &address_map, &nodes, &config)?;

        info!(entity ; "built {} routing tables for {}, budget {}, {} forwarding",
            nodes.len(), topology, config.budget, config.forwarding);

        Ok(MeshPlatform {
            entity,
            config,
            address_map,
            nodes,
        })
    }

    #[must_use]
    pub fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }

    #[must_use]
    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    #[must_use]
    pub fn topology(&self) -> &GridTopology {
        self.address_map.topology()
    }

    #[must_use]
    pub fn address_map(&self) -> &AddressMap {
        &self.address_map
    }

    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn nodes(&self) -> &[Rc<RdmaEngine>] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Result<&Rc<RdmaEngine>, SimError> {
        match id.0.checked_sub(1).and_then(|i| self.nodes.get(i)) {
            Some(node) => Ok(node),
            None => sim_error!("Unknown node {id} in platform '{}'", self.config.name),
        }
    }

    pub fn node_at(&self, coordinate: Coordinate) -> Result<&Rc<RdmaEngine>, SimError> {
        let id = self.topology().node_id_of(coordinate)?;
        self.node(id)
    }
}

impl Display for MeshPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{}: {}, budget {}, {} forwarding",
            self.entity,
            self.topology(),
            self.config.budget,
            self.config.forwarding
        )?;
        writeln!(f, "Nodes:")?;
        for (node, entry) in self.nodes.iter().zip(self.address_map.entries()) {
            writeln!(
                f,
                "  {}: {} [{:#x}, {:#x})",
                node.node(),
                node,
                entry.low_addr,
                entry.high_addr
            )?;
        }
        Ok(())
    }
}
