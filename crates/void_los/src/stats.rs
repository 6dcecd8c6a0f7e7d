//! Per-query profiling counters

use std::fmt;
use std::ops::AddAssign;

/// Counters filled in by ray queries when a caller asks for them
///
/// Purely diagnostic: passing `None` instead of a `RayStats` never changes a
/// query result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RayStats {
    /// Tree nodes entered
    pub nodes_visited: u64,
    /// Ray/box slab tests performed
    pub box_tests: u64,
    /// Ray/object tests performed (triangles, or nested colliders)
    pub object_tests: u64,
    /// Object tests that shortened the current best distance
    pub hits: u64,
}

impl RayStats {
    pub const fn new() -> Self {
        Self {
            nodes_visited: 0,
            box_tests: 0,
            object_tests: 0,
            hits: 0,
        }
    }

    /// Reset all counters to zero
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl AddAssign for RayStats {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes_visited += rhs.nodes_visited;
        self.box_tests += rhs.box_tests;
        self.object_tests += rhs.object_tests;
        self.hits += rhs.hits;
    }
}

impl fmt::Display for RayStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes={} boxes={} objects={} hits={}",
            self.nodes_visited, self.box_tests, self.object_tests, self.hits
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_and_clear() {
        let mut total = RayStats::new();
        total += RayStats { nodes_visited: 2, box_tests: 3, object_tests: 4, hits: 1 };
        total += RayStats { nodes_visited: 1, ..Default::default() };
        assert_eq!(total.nodes_visited, 3);
        assert_eq!(total.to_string(), "nodes=3 boxes=3 objects=4 hits=1");

        total.clear();
        assert_eq!(total, RayStats::default());
    }
}
