// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Bounded-hop remote-memory routing for a 2-D mesh of nodes.
//!
//! Every node of the mesh owns a slice of the global address space. A node
//! may only access memory of nodes at most `max_num_hops` mesh hops away.
//! Accesses to nodes further away are sent to a forwarding node on the edge
//! of the hop budget which passes them on.
//!
//! The pieces fit together as follows:
//!
//!  - [`GridTopology`](grid::GridTopology) maps node IDs to grid cells.
//!  - [`distance`](hops::distance) and [`HopBudget`](hops::HopBudget) decide
//!    which nodes can be reached directly.
//!  - [`QuadrantPartition`](quadrant::QuadrantPartition) groups the other
//!    nodes by direction from a reference node.
//!  - [`select_forwarding_ports`](forwarding::select_forwarding_ports) picks
//!    one forwarding node per quadrant.
//!  - [`AddressRangeTableBuilder`](table::AddressRangeTableBuilder) produces
//!    one [`RoutingTable`](table::RoutingTable) per node.
//!  - [`RemoteAddressRouter`](router::RemoteAddressRouter) resolves an
//!    address to a port using a table.
//!
//! # Example
//!
//! ```rust
//! use hopmesh_routing::address_map::AddressMap;
//! use hopmesh_routing::grid::{GridTopology, NodeId};
//! use hopmesh_routing::hops::HopBudget;
//! use hopmesh_routing::router::RemoteAddressRouter;
//! use hopmesh_routing::table::AddressRangeTableBuilder;
//! use hopmesh_routing::types::PortId;
//! use hopmesh_track::entity::toplevel;
//! use hopmesh_track::tracker::dev_null_tracker;
//!
//! let tracker = dev_null_tracker();
//! let top = toplevel(&tracker, "top");
//!
//! let grid = GridTopology::new(3, 3).unwrap();
//! let map = AddressMap::new(grid, 0x1000, |node, _| Ok(PortId(node.0 as u64))).unwrap();
//! let builder = AddressRangeTableBuilder::new(&top, &map, HopBudget::new(1).unwrap());
//!
//! let router = RemoteAddressRouter::new(builder.build_for(NodeId(1)).unwrap());
//! // Node 2 is one hop away so its memory is accessed directly.
//! assert_eq!(router.resolve(0x2000).unwrap(), PortId(2));
//! ```

pub mod address_map;
pub mod forwarding;
pub mod grid;
pub mod hops;
pub mod quadrant;
pub mod router;
pub mod table;
pub mod types;
