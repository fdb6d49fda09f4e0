// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Partition the mesh into quadrants as seen from a reference node.
//!
//! The quadrants are the half-planes strictly above, below, left and right of
//! the reference node. A diagonal node therefore belongs to two quadrants and
//! a node on the same row or column belongs to exactly one.

use std::fmt;

use crate::address_map::AddressMappingEntry;
use crate::grid::{Coordinate, GridTopology};

/// One of the four half-planes around a reference node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quadrant {
    /// Smaller row index.
    Above,
    /// Larger row index.
    Below,
    /// Smaller column index.
    Left,
    /// Larger column index.
    Right,
}

impl Quadrant {
    /// All quadrants, in the order forwarding ports are chosen.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::Above,
        Quadrant::Below,
        Quadrant::Left,
        Quadrant::Right,
    ];

    fn index(self) -> usize {
        match self {
            Quadrant::Above => 0,
            Quadrant::Below => 1,
            Quadrant::Left => 2,
            Quadrant::Right => 3,
        }
    }

    /// `coordinate` lies in this quadrant of `reference`.
    #[must_use]
    pub fn contains(self, reference: Coordinate, coordinate: Coordinate) -> bool {
        match self {
            Quadrant::Above => coordinate.y < reference.y,
            Quadrant::Below => coordinate.y > reference.y,
            Quadrant::Left => coordinate.x < reference.x,
            Quadrant::Right => coordinate.x > reference.x,
        }
    }

    /// The grid extends beyond `reference` in this direction.
    #[must_use]
    pub fn is_open(self, topology: &GridTopology, reference: Coordinate) -> bool {
        match self {
            Quadrant::Above => reference.y > 0,
            Quadrant::Below => reference.y < topology.max_y(),
            Quadrant::Left => reference.x > 0,
            Quadrant::Right => reference.x < topology.max_x(),
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Quadrant::Above => "above",
            Quadrant::Below => "below",
            Quadrant::Left => "left",
            Quadrant::Right => "right",
        };
        write!(f, "{name}")
    }
}

/// A small set of quadrants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct QuadrantSet(u8);

impl QuadrantSet {
    #[must_use]
    pub fn empty() -> Self {
        Self(0)
    }

    /// The quadrants of `reference` that contain `coordinate`.
    #[must_use]
    pub fn of(reference: Coordinate, coordinate: Coordinate) -> Self {
        let mut set = Self::empty();
        for quadrant in Quadrant::ALL {
            if quadrant.contains(reference, coordinate) {
                set.insert(quadrant);
            }
        }
        set
    }

    pub fn insert(&mut self, quadrant: Quadrant) {
        self.0 |= 1 << quadrant.index();
    }

    #[must_use]
    pub fn contains(&self, quadrant: Quadrant) -> bool {
        self.0 & (1 << quadrant.index()) != 0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterate in [`Quadrant::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = Quadrant> {
        let set = *self;
        Quadrant::ALL.into_iter().filter(move |q| set.contains(*q))
    }
}

impl FromIterator<Quadrant> for QuadrantSet {
    fn from_iter<I: IntoIterator<Item = Quadrant>>(iter: I) -> Self {
        let mut set = Self::empty();
        for quadrant in iter {
            set.insert(quadrant);
        }
        set
    }
}

/// Classification of a reference node by the sides on which the grid
/// continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuadrantLayout {
    /// No other cell exists. Only possible for a single-cell grid.
    Isolated,
    /// One open side: the end of a one-wide grid.
    End(Quadrant),
    /// Two open sides: a corner, or the middle of a one-wide grid.
    Corner([Quadrant; 2]),
    /// Three open sides: a non-corner cell on the grid edge.
    Edge([Quadrant; 3]),
    /// All four sides open.
    Interior,
}

impl QuadrantLayout {
    #[must_use]
    pub fn of(topology: &GridTopology, reference: Coordinate) -> Self {
        let open: Vec<Quadrant> = Quadrant::ALL
            .into_iter()
            .filter(|q| q.is_open(topology, reference))
            .collect();
        match open.as_slice() {
            [] => QuadrantLayout::Isolated,
            [a] => QuadrantLayout::End(*a),
            [a, b] => QuadrantLayout::Corner([*a, *b]),
            [a, b, c] => QuadrantLayout::Edge([*a, *b, *c]),
            _ => QuadrantLayout::Interior,
        }
    }

    /// The quadrants that may contain nodes.
    #[must_use]
    pub fn quadrants(&self) -> QuadrantSet {
        match self {
            QuadrantLayout::Isolated => QuadrantSet::empty(),
            QuadrantLayout::End(q) => [*q].into_iter().collect(),
            QuadrantLayout::Corner(qs) => qs.iter().copied().collect(),
            QuadrantLayout::Edge(qs) => qs.iter().copied().collect(),
            QuadrantLayout::Interior => Quadrant::ALL.into_iter().collect(),
        }
    }
}

/// The other nodes of the mesh grouped by the quadrants of a reference node.
///
/// Members keep the order of the entries they were built from, which is
/// node ID order for an [`AddressMap`](crate::address_map::AddressMap).
pub struct QuadrantPartition<'a> {
    reference: Coordinate,
    layout: QuadrantLayout,
    members: [Vec<&'a AddressMappingEntry>; 4],
}

impl<'a> QuadrantPartition<'a> {
    #[must_use]
    pub fn new(
        topology: &GridTopology,
        reference: Coordinate,
        entries: &'a [AddressMappingEntry],
    ) -> Self {
        let mut members: [Vec<&'a AddressMappingEntry>; 4] = Default::default();
        for entry in entries {
            if entry.coordinate == reference {
                continue;
            }
            for quadrant in QuadrantSet::of(reference, entry.coordinate).iter() {
                members[quadrant.index()].push(entry);
            }
        }
        Self {
            reference,
            layout: QuadrantLayout::of(topology, reference),
            members,
        }
    }

    #[must_use]
    pub fn reference(&self) -> Coordinate {
        self.reference
    }

    #[must_use]
    pub fn layout(&self) -> QuadrantLayout {
        self.layout
    }

    #[must_use]
    pub fn members(&self, quadrant: Quadrant) -> &[&'a AddressMappingEntry] {
        &self.members[quadrant.index()]
    }

    /// The quadrants holding at least one node.
    #[must_use]
    pub fn non_empty(&self) -> QuadrantSet {
        Quadrant::ALL
            .into_iter()
            .filter(|q| !self.members(*q).is_empty())
            .collect()
    }

    /// The quadrants of the reference that contain `coordinate`.
    #[must_use]
    pub fn quadrants_of(&self, coordinate: Coordinate) -> QuadrantSet {
        QuadrantSet::of(self.reference, coordinate)
    }
}
