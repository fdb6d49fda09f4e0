// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Geometry of a rectangular mesh of nodes.
//!
//! Nodes are laid out on a `num_columns` x `num_rows` grid. The centre cell,
//! `(num_columns / 2, num_rows / 2)`, holds the host controller instead of a
//! node. The remaining cells are numbered from 1 in row-major order, skipping
//! the centre. Node ID 0 is reserved for the controller.

use std::fmt;

use crate::sim_error;
use crate::types::SimError;

/// Column (`x`) and row (`y`) of a grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

impl Coordinate {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Identifier of a node in the mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ID reserved for the host controller in the centre of the grid.
pub const CONTROLLER_ID: NodeId = NodeId(0);

/// A rectangular grid with the centre cell excluded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridTopology {
    num_columns: usize,
    num_rows: usize,
    excluded: Coordinate,
}

impl GridTopology {
    /// Create a grid of `num_columns` x `num_rows` cells.
    ///
    /// At least two cells are needed so that one node remains once the
    /// centre has been excluded.
    pub fn new(num_columns: usize, num_rows: usize) -> Result<Self, SimError> {
        if num_columns == 0 || num_rows == 0 {
            return sim_error!("Invalid grid {num_columns}x{num_rows}: dimensions must be >= 1");
        }
        if num_columns * num_rows < 2 {
            return sim_error!(
                "Invalid grid {num_columns}x{num_rows}: no nodes remain once the centre is excluded"
            );
        }
        Ok(Self {
            num_columns,
            num_rows,
            excluded: Coordinate::new(num_columns / 2, num_rows / 2),
        })
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// The largest valid column index.
    #[must_use]
    pub fn max_x(&self) -> usize {
        self.num_columns - 1
    }

    /// The largest valid row index.
    #[must_use]
    pub fn max_y(&self) -> usize {
        self.num_rows - 1
    }

    /// The centre cell that holds no node.
    #[must_use]
    pub fn excluded(&self) -> Coordinate {
        self.excluded
    }

    /// Number of nodes in the grid, excluding the centre cell.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.num_columns * self.num_rows - 1
    }

    #[must_use]
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        coordinate.x < self.num_columns && coordinate.y < self.num_rows
    }

    #[must_use]
    pub fn is_excluded(&self, coordinate: Coordinate) -> bool {
        coordinate == self.excluded
    }

    fn excluded_index(&self) -> usize {
        self.excluded.y * self.num_columns + self.excluded.x
    }

    /// Return the cell occupied by the node `id`.
    pub fn coordinate_of(&self, id: NodeId) -> Result<Coordinate, SimError> {
        if id == CONTROLLER_ID || id.0 > self.num_nodes() {
            return sim_error!(
                "Unknown node {id} in {}x{} grid",
                self.num_columns,
                self.num_rows
            );
        }
        let index = if id.0 <= self.excluded_index() {
            id.0 - 1
        } else {
            id.0
        };
        Ok(Coordinate::new(
            index % self.num_columns,
            index / self.num_columns,
        ))
    }

    /// Return the ID of the node at `coordinate`.
    pub fn node_id_of(&self, coordinate: Coordinate) -> Result<NodeId, SimError> {
        if !self.contains(coordinate) {
            return sim_error!(
                "Unknown node at {coordinate}: outside {}x{} grid",
                self.num_columns,
                self.num_rows
            );
        }
        if self.is_excluded(coordinate) {
            return sim_error!("Unknown node at {coordinate}: cell is reserved for the controller");
        }
        let index = coordinate.y * self.num_columns + coordinate.x;
        if index < self.excluded_index() {
            Ok(NodeId(index + 1))
        } else {
            Ok(NodeId(index))
        }
    }

    /// Iterate over the node cells in row-major scan order.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.num_rows)
            .flat_map(move |y| (0..self.num_columns).map(move |x| Coordinate::new(x, y)))
            .filter(move |c| !self.is_excluded(*c))
    }

    /// Iterate over the node IDs in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (1..=self.num_nodes()).map(NodeId)
    }
}

impl fmt::Display for GridTopology {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}x{} grid, controller at {}",
            self.num_columns, self.num_rows, self.excluded
        )
    }
}
