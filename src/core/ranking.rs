//! Max-priority ranking of facets by farthest-outside distance.
//!
//! An ordered set over `(distance, facet)` pairs gives log-time insert and
//! targeted removal plus cheap max-peek; a side index from facet id to its
//! ranked distance makes the targeted removal possible without a scan.

use crate::core::collections::{FacetId, FastHashMap};
use crate::geometry::coordinate::CoordinateScalar;
use ordered_float::OrderedFloat;
use std::collections::BTreeSet;

/// Priority structure over facets with non-empty outside sets.
///
/// Only facets whose farthest outside point lies beyond the tolerance are
/// ever ranked; everything else is already part of the final hull boundary.
#[derive(Clone, Debug)]
pub struct RankingQueue<T: CoordinateScalar> {
    eps: T,
    by_distance: BTreeSet<(OrderedFloat<T>, FacetId)>,
    index: FastHashMap<FacetId, OrderedFloat<T>>,
}

impl<T: CoordinateScalar> RankingQueue<T> {
    /// Creates an empty queue bound to the admission tolerance.
    #[must_use]
    pub fn new(eps: T) -> Self {
        debug_assert!(!(eps < T::zero()));
        Self {
            eps,
            by_distance: BTreeSet::new(),
            index: FastHashMap::default(),
        }
    }

    /// Ranks a facet by its farthest-outside distance. Distances that do not
    /// exceed the tolerance are ignored: such facets have no expansion work.
    pub fn rank(&mut self, distance: T, facet: FacetId) {
        if self.eps < distance {
            let key = OrderedFloat(distance);
            let previous = self.index.insert(facet, key);
            debug_assert!(previous.is_none(), "facet {facet} ranked twice");
            self.by_distance.insert((key, facet));
        }
    }

    /// Removes a facet's ranking entry, if any.
    pub fn unrank(&mut self, facet: FacetId) {
        if let Some(key) = self.index.remove(&facet) {
            let removed = self.by_distance.remove(&(key, facet));
            debug_assert!(removed);
        }
    }

    /// The facet with the globally largest farthest-outside distance.
    #[must_use]
    pub fn peek_best(&self) -> Option<FacetId> {
        self.by_distance.last().map(|&(_, facet)| facet)
    }

    /// Rewrites a ranked facet's id after its record moved during compaction.
    pub fn migrate(&mut self, from: FacetId, to: FacetId) {
        if let Some(key) = self.index.remove(&from) {
            self.by_distance.remove(&(key, from));
            self.by_distance.insert((key, to));
            self.index.insert(to, key);
        }
    }

    /// Number of ranked facets.
    #[must_use]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.by_distance.len(), self.index.len());
        self.by_distance.len()
    }

    /// Whether no facet has expansion work left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_distance.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peeks_maximum_distance() {
        let mut queue = RankingQueue::new(1e-9);
        queue.rank(0.5, 10);
        queue.rank(2.0, 11);
        queue.rank(1.0, 12);
        assert_eq!(queue.peek_best(), Some(11));
        queue.unrank(11);
        assert_eq!(queue.peek_best(), Some(12));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn distances_within_tolerance_are_not_ranked() {
        let mut queue = RankingQueue::new(1e-3);
        queue.rank(1e-4, 3);
        queue.rank(0.0, 4);
        assert!(queue.is_empty());
        // unranking a facet that was never ranked is a no-op
        queue.unrank(3);
    }

    #[test]
    fn migrate_follows_compaction_moves() {
        let mut queue = RankingQueue::new(0.0);
        queue.rank(1.5, 9);
        queue.migrate(9, 2);
        assert_eq!(queue.peek_best(), Some(2));
        queue.unrank(2);
        assert!(queue.is_empty());
    }
}
