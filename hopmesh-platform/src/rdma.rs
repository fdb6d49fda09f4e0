// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The per-node remote-access (RDMA) engine.
//!
//! This only models what the routing needs from the engine: a set of named
//! egress ports, a routing table that is set once when the platform is
//! built, and the lookup of the port an outgoing access leaves through.

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use hopmesh_routing::grid::{Coordinate, NodeId};
use hopmesh_routing::router::RemoteAddressRouter;
use hopmesh_routing::sim_error;
use hopmesh_routing::table::RoutingTable;
use hopmesh_routing::types::{PortId, SimError, SimResult};
use hopmesh_track::entity::Entity;
use hopmesh_track::{debug, trace};

pub struct RdmaEngine {
    entity: Rc<Entity>,
    node: NodeId,
    coordinate: Coordinate,
    ports: RefCell<Vec<(String, PortId)>>,
    router: OnceCell<RemoteAddressRouter>,
}

impl RdmaEngine {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, node: NodeId, coordinate: Coordinate) -> Self {
        let name = format!("gpu_{node}");
        Self {
            entity: Rc::new(Entity::new(parent, &name)),
            node,
            coordinate,
            ports: RefCell::new(Vec::new()),
            router: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn entity(&self) -> &Rc<Entity> {
        &self.entity
    }

    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Add a named egress port.
    pub fn register_port(&self, name: &str, port: PortId) -> SimResult {
        let mut ports = self.ports.borrow_mut();
        if ports.iter().any(|(n, _)| n == name) {
            return sim_error!("Duplicate port '{name}' on {}", self.entity);
        }
        trace!(self.entity ; "register {port} as '{name}'");
        ports.push((name.to_string(), port));
        Ok(())
    }

    pub fn port_by_name(&self, name: &str) -> Result<PortId, SimError> {
        match self.ports.borrow().iter().find(|(n, _)| n == name) {
            Some((_, port)) => Ok(*port),
            None => sim_error!("No port '{name}' on {}", self.entity),
        }
    }

    /// Hand the routing table of this node to the engine.
    ///
    /// The table can only be set once and must have been built for this node.
    pub fn set_remote_routing_table(&self, table: RoutingTable) -> SimResult {
        if table.owner() != self.node {
            return sim_error!(
                "Routing table for node {} given to {}",
                table.owner(),
                self.entity
            );
        }
        debug!(self.entity ; "routing table: {}", table.summary());
        if self.router.set(RemoteAddressRouter::new(table)).is_err() {
            return sim_error!("Routing table already set on {}", self.entity);
        }
        Ok(())
    }

    pub fn router(&self) -> Result<&RemoteAddressRouter, SimError> {
        match self.router.get() {
            Some(router) => Ok(router),
            None => sim_error!("No routing table set on {}", self.entity),
        }
    }

    /// Return the port an access to `addr` leaves this node through.
    pub fn route(&self, addr: u64) -> Result<PortId, SimError> {
        let port = self.router()?.resolve(addr)?;
        trace!(self.entity ; "{addr:#x} -> {port}");
        Ok(port)
    }
}

impl fmt::Display for RdmaEngine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at {}", self.entity, self.coordinate)?;
        for (name, port) in self.ports.borrow().iter() {
            write!(f, ", {name}: {port}")?;
        }
        Ok(())
    }
}
