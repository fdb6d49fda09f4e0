// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::path::Path;

use hopmesh_platform::MeshPlatform;
use hopmesh_routing::grid::{Coordinate, NodeId};
use hopmesh_track::entity::toplevel;
use hopmesh_track::test_helpers::create_tracker;

const MESH_3X3: &str = "
mesh:
  columns: 3
  rows: 3
  max_num_hops: 1
";

fn build(config: &str) -> MeshPlatform {
    let tracker = create_tracker(file!());
    let top = toplevel(&tracker, "top");
    MeshPlatform::from_string(&top, config).unwrap()
}

#[test]
#[should_panic(expected = "Invalid grid")]
fn zero_columns() {
    build(
        "
mesh:
  columns: 0
  rows: 3
  max_num_hops: 1
",
    );
}

#[test]
#[should_panic(expected = "Invalid grid")]
fn single_cell() {
    build(
        "
mesh:
  columns: 1
  rows: 1
  max_num_hops: 1
",
    );
}

#[test]
#[should_panic(expected = "Invalid hop budget")]
fn negative_hop_budget() {
    build(
        "
mesh:
  columns: 3
  rows: 3
  max_num_hops: -2
",
    );
}

#[test]
#[should_panic(expected = "Invalid node memory size")]
fn zero_node_memory() {
    build(
        "
mesh:
  columns: 3
  rows: 3
  max_num_hops: 1
  node_memory_bytes: 0
",
    );
}

#[test]
#[should_panic(expected = "Address space overflow")]
fn node_memory_too_large() {
    build(
        "
mesh:
  columns: 5
  rows: 5
  max_num_hops: 1
  node_memory_bytes: 0x1000_0000_0000_0000
",
    );
}

#[test]
#[should_panic(expected = "serde_yaml::from_str failed")]
fn missing_rows() {
    build(
        "
mesh:
  columns: 3
  max_num_hops: 1
",
    );
}

#[test]
#[should_panic(expected = "serde_yaml::from_str failed")]
fn unknown_forwarding() {
    build(
        "
mesh:
  columns: 3
  rows: 3
  max_num_hops: 1
  forwarding: shortest
",
    );
}

#[test]
#[should_panic(expected = "Unable to read")]
fn missing_file() {
    let tracker = create_tracker(file!());
    let top = toplevel(&tracker, "top");
    MeshPlatform::from_file(&top, Path::new("demos/does_not_exist.yaml")).unwrap();
}

#[test]
#[should_panic(expected = "Unknown node")]
fn controller_is_not_a_node() {
    build(MESH_3X3).node(NodeId(0)).unwrap();
}

#[test]
#[should_panic(expected = "Unknown node")]
fn centre_is_not_a_node() {
    build(MESH_3X3).node_at(Coordinate::new(1, 1)).unwrap();
}

#[test]
#[should_panic(expected = "No route for address 0x80")]
fn controller_memory_is_not_routed() {
    let platform = build(MESH_3X3);
    platform.node(NodeId(1)).unwrap().route(0x80).unwrap();
}

#[test]
#[should_panic(expected = "No port 'ToInside'")]
fn unknown_port() {
    let platform = build(MESH_3X3);
    platform
        .node(NodeId(1))
        .unwrap()
        .port_by_name("ToInside")
        .unwrap();
}

#[test]
#[should_panic(expected = "Routing table already set")]
fn table_set_twice() {
    let platform = build(MESH_3X3);
    let node = platform.node(NodeId(3)).unwrap();
    let table = node.router().unwrap().table().clone();
    node.set_remote_routing_table(table).unwrap();
}
