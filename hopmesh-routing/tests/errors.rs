// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use hopmesh_routing::address_map::AddressMap;
use hopmesh_routing::grid::{Coordinate, GridTopology, NodeId};
use hopmesh_routing::hops::HopBudget;
use hopmesh_routing::router::RemoteAddressRouter;
use hopmesh_routing::table::AddressRangeTableBuilder;
use hopmesh_routing::types::PortId;
use hopmesh_track::entity::toplevel;
use hopmesh_track::test_helpers::create_tracker;

const NODE_MEMORY_BYTES: u64 = 0x1000;

fn router_for(node: NodeId) -> RemoteAddressRouter {
    let tracker = create_tracker(file!());
    let top = toplevel(&tracker, "top");
    let grid = GridTopology::new(3, 3).unwrap();
    let map = AddressMap::new(grid, NODE_MEMORY_BYTES, |node, _| Ok(PortId(node.0 as u64))).unwrap();
    let builder = AddressRangeTableBuilder::new(&top, &map, HopBudget::new(1).unwrap());
    RemoteAddressRouter::new(builder.build_for(node).unwrap())
}

#[test]
#[should_panic(expected = "Invalid grid")]
fn zero_width_grid() {
    GridTopology::new(0, 3).unwrap();
}

#[test]
#[should_panic(expected = "Invalid grid")]
fn single_cell_grid() {
    GridTopology::new(1, 1).unwrap();
}

#[test]
#[should_panic(expected = "Invalid hop budget")]
fn negative_hop_budget() {
    HopBudget::new(-1).unwrap();
}

#[test]
#[should_panic(expected = "Unknown node")]
fn controller_has_no_coordinate() {
    let grid = GridTopology::new(3, 3).unwrap();
    grid.coordinate_of(NodeId(0)).unwrap();
}

#[test]
#[should_panic(expected = "Unknown node")]
fn centre_has_no_node() {
    let grid = GridTopology::new(5, 5).unwrap();
    grid.node_id_of(Coordinate::new(2, 2)).unwrap();
}

#[test]
#[should_panic(expected = "Unknown node")]
fn table_for_unknown_node() {
    router_for(NodeId(9));
}

#[test]
#[should_panic(expected = "No route for address 0x800")]
fn controller_range_is_not_routed() {
    router_for(NodeId(1)).resolve(0x800).unwrap();
}

#[test]
#[should_panic(expected = "No route for address 0x9000")]
fn address_beyond_last_node() {
    router_for(NodeId(1)).resolve(0x9000).unwrap();
}
