// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Properties every routing table must have, checked over a range of grid
//! shapes, hop budgets and both forwarding strategies.

use hopmesh_routing::address_map::AddressMap;
use hopmesh_routing::forwarding::{ForwardingStrategy, select_forwarding_ports};
use hopmesh_routing::grid::{Coordinate, GridTopology};
use hopmesh_routing::hops::{HopBudget, distance};
use hopmesh_routing::quadrant::{QuadrantPartition, QuadrantSet};
use hopmesh_routing::router::RemoteAddressRouter;
use hopmesh_routing::table::{AddressRangeTableBuilder, RouteKind, RoutingTable};
use hopmesh_routing::types::PortId;
use hopmesh_track::entity::toplevel;
use hopmesh_track::tracker::dev_null_tracker;

const NODE_MEMORY_BYTES: u64 = 0x1_0000;

const GRIDS: [(usize, usize); 8] = [
    (1, 2),
    (2, 1),
    (1, 5),
    (3, 3),
    (4, 4),
    (5, 5),
    (6, 3),
    (7, 2),
];

const STRATEGIES: [ForwardingStrategy; 2] = [
    ForwardingStrategy::Quadrant,
    ForwardingStrategy::NearestBoundary,
];

fn build_map(num_columns: usize, num_rows: usize) -> AddressMap {
    let grid = GridTopology::new(num_columns, num_rows).unwrap();
    AddressMap::new(grid, NODE_MEMORY_BYTES, |node, _| Ok(PortId(node.0 as u64))).unwrap()
}

fn diameter(map: &AddressMap) -> usize {
    let topology = map.topology();
    topology.max_x() + topology.max_y()
}

/// Run `check` on every table for every grid, budget and strategy.
fn for_all_tables<F>(mut check: F)
where
    F: FnMut(&AddressMap, HopBudget, ForwardingStrategy, &RoutingTable),
{
    let tracker = dev_null_tracker();
    let top = toplevel(&tracker, "top");
    for (w, h) in GRIDS {
        let map = build_map(w, h);
        for hops in 0..=diameter(&map) + 1 {
            let budget = HopBudget::from_hops(hops);
            for strategy in STRATEGIES {
                let tables = AddressRangeTableBuilder::new(&top, &map, budget)
                    .with_strategy(strategy)
                    .with_seed(0x5eed)
                    .build_all()
                    .unwrap();
                assert_eq!(tables.len(), map.topology().num_nodes());
                for table in &tables {
                    check(&map, budget, strategy, table);
                }
            }
        }
    }
}

fn coordinate_of(map: &AddressMap, table: &RoutingTable) -> Coordinate {
    map.topology().coordinate_of(table.owner()).unwrap()
}

#[test]
fn every_node_covered_once() {
    for_all_tables(|map, _, _, table| {
        for node in map.entries() {
            let covering: Vec<_> = table
                .entries()
                .iter()
                .filter(|e| e.low_addr <= node.low_addr && node.high_addr <= e.high_addr)
                .collect();
            assert_eq!(covering.len(), 1);
            assert_eq!(covering[0].destination, node.node);
        }
    });
}

#[test]
fn ranges_are_contiguous_and_complete() {
    for_all_tables(|map, _, _, table| {
        let entries = table.entries();
        let num_nodes = map.topology().num_nodes() as u64;
        assert_eq!(entries.len() as u64, num_nodes);
        assert_eq!(entries[0].low_addr, NODE_MEMORY_BYTES);
        assert_eq!(
            entries[entries.len() - 1].high_addr,
            (num_nodes + 1) * NODE_MEMORY_BYTES
        );
        for pair in entries.windows(2) {
            assert_eq!(pair[0].high_addr, pair[1].low_addr);
        }
    });
}

#[test]
fn nodes_within_budget_are_direct() {
    for_all_tables(|map, budget, _, table| {
        let reference = coordinate_of(map, table);
        let router = RemoteAddressRouter::new(table.clone());
        for node in map.entries() {
            if budget.is_within(reference, node.coordinate) {
                assert_eq!(router.resolve(node.low_addr).unwrap(), node.port);
                assert!(router.resolve_entry(node.low_addr).unwrap().is_direct());
            }
        }
    });
}

#[test]
fn nodes_beyond_budget_are_forwarded() {
    for_all_tables(|map, budget, strategy, table| {
        let reference = coordinate_of(map, table);
        let partition = QuadrantPartition::new(map.topology(), reference, map.entries());
        let plan = select_forwarding_ports(&partition, budget);

        for entry in table.entries() {
            let destination = map.entry(entry.destination).unwrap();
            if budget.is_within(reference, destination.coordinate) {
                continue;
            }
            let RouteKind::Forwarded { via, quadrant } = entry.kind else {
                panic!("{} should be forwarded from {reference}", destination.coordinate);
            };
            let via = map.entry(via).unwrap();
            assert_eq!(entry.port, via.port);
            assert!(distance(reference, via.coordinate) >= budget.max_num_hops());

            match strategy {
                ForwardingStrategy::Quadrant => {
                    let quadrant = quadrant.unwrap();
                    assert!(
                        QuadrantSet::of(reference, destination.coordinate).contains(quadrant)
                    );
                    assert_eq!(plan.get(quadrant).unwrap().node, via.node);
                }
                ForwardingStrategy::NearestBoundary => assert!(quadrant.is_none()),
            }
        }
    });
}

#[test]
fn forwarding_nodes_sit_on_the_boundary_when_possible() {
    for_all_tables(|map, budget, strategy, table| {
        if strategy != ForwardingStrategy::Quadrant {
            return;
        }
        let reference = coordinate_of(map, table);
        let partition = QuadrantPartition::new(map.topology(), reference, map.entries());
        for assignment in select_forwarding_ports(&partition, budget).iter() {
            let has_boundary = partition
                .members(assignment.quadrant)
                .iter()
                .any(|e| budget.is_on_boundary(reference, e.coordinate));
            if has_boundary {
                assert_eq!(assignment.hops, budget.max_num_hops());
            } else {
                assert!(assignment.hops > budget.max_num_hops());
            }
        }
    });
}

#[test]
fn quadrants_use_distinct_forwarding_nodes() {
    let map = build_map(9, 9);
    let reference = Coordinate::new(2, 2);
    let partition = QuadrantPartition::new(map.topology(), reference, map.entries());

    for hops in 1..=2 {
        let plan = select_forwarding_ports(&partition, HopBudget::from_hops(hops));
        assert_eq!(plan.len(), 4);
        let mut nodes: Vec<_> = plan.iter().map(|a| a.node).collect();
        nodes.sort_unstable();
        nodes.dedup();
        assert_eq!(nodes.len(), 4);
    }
}

#[test]
fn fixed_seed_is_deterministic() {
    let tracker = dev_null_tracker();
    let top = toplevel(&tracker, "top");
    let map = build_map(7, 7);
    let budget = HopBudget::from_hops(2);

    for strategy in STRATEGIES {
        let build = || {
            AddressRangeTableBuilder::new(&top, &map, budget)
                .with_strategy(strategy)
                .with_seed(42)
                .build_all()
                .unwrap()
        };
        assert_eq!(build(), build());
    }
}

#[test]
fn table_does_not_depend_on_build_order() {
    let tracker = dev_null_tracker();
    let top = toplevel(&tracker, "top");
    let map = build_map(5, 5);
    let builder = AddressRangeTableBuilder::new(&top, &map, HopBudget::from_hops(1)).with_seed(7);

    let all = builder.build_all().unwrap();
    for table in all.iter().rev() {
        assert_eq!(&builder.build_for(table.owner()).unwrap(), table);
    }
}
