// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Hop distance between grid cells and the budget a direct access may use.

use std::fmt;

use crate::grid::Coordinate;
use crate::sim_error;
use crate::types::SimError;

/// Manhattan distance between two cells: the number of mesh hops a packet
/// takes between them.
#[must_use]
pub fn distance(a: Coordinate, b: Coordinate) -> usize {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

/// The maximum number of hops a direct remote access is allowed to take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HopBudget(usize);

impl HopBudget {
    /// Create a budget from a configured value, which may be negative when
    /// read from user input.
    pub fn new(max_num_hops: i64) -> Result<Self, SimError> {
        match usize::try_from(max_num_hops) {
            Ok(hops) => Ok(Self(hops)),
            Err(_) => sim_error!("Invalid hop budget {max_num_hops}: must be >= 0"),
        }
    }

    #[must_use]
    pub const fn from_hops(max_num_hops: usize) -> Self {
        Self(max_num_hops)
    }

    #[must_use]
    pub fn max_num_hops(&self) -> usize {
        self.0
    }

    /// `b` can be reached from `a` without forwarding.
    #[must_use]
    pub fn is_within(&self, a: Coordinate, b: Coordinate) -> bool {
        distance(a, b) <= self.0
    }

    /// `b` sits exactly at the edge of the budget from `a`.
    #[must_use]
    pub fn is_on_boundary(&self, a: Coordinate, b: Coordinate) -> bool {
        distance(a, b) == self.0
    }
}

impl fmt::Display for HopBudget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} hops", self.0)
    }
}
