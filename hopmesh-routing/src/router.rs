// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Resolve outgoing remote accesses to an egress port.

use crate::grid::NodeId;
use crate::table::{RouteEntry, RoutingTable};
use crate::types::{PortId, SimError};

/// The lookup side of a [`RoutingTable`], owned by a node's remote-access
/// engine once the platform has been built.
#[derive(Clone, Debug)]
pub struct RemoteAddressRouter {
    table: RoutingTable,
}

impl RemoteAddressRouter {
    #[must_use]
    pub fn new(table: RoutingTable) -> Self {
        Self { table }
    }

    #[must_use]
    pub fn owner(&self) -> NodeId {
        self.table.owner()
    }

    #[must_use]
    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Return the port an access to `addr` must be sent to.
    pub fn resolve(&self, addr: u64) -> Result<PortId, SimError> {
        self.resolve_entry(addr).map(|entry| entry.port)
    }

    /// Return the table entry covering `addr`.
    pub fn resolve_entry(&self, addr: u64) -> Result<&RouteEntry, SimError> {
        self.table.entry_for(addr).ok_or_else(|| {
            SimError(format!(
                "No route for address {addr:#x} from node {}",
                self.table.owner()
            ))
        })
    }
}

impl From<RoutingTable> for RemoteAddressRouter {
    fn from(table: RoutingTable) -> Self {
        Self::new(table)
    }
}
