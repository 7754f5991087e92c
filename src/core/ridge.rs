//! Hash-based pairing of new facets across shared ridges.
//!
//! During a horizon walk every new facet knows only one neighbour up front:
//! the retained facet across its apex position. Its remaining adjacency is
//! discovered by matching `(D-2)`-faces (ridges) against the other facets
//! created in the same walk.
//!
//! A ridge between two sibling facets always contains the apex, so the apex
//! can be dropped from the key: the key for position `v` of a facet is the
//! XOR of the mixed identity hashes of its vertices excluding both the apex
//! position and `v`. XOR is symmetric, so two facets sharing the same ridge
//! collide no matter which single vertex each of them excludes. A collision
//! is confirmed by an exact O(D²) vertex-set comparison before wiring.

use crate::core::collections::{FacetId, FastHashMap, PointId, SmallBuffer};
use crate::core::facet::FacetStore;
use crate::geometry::coordinate::CoordinateScalar;

#[derive(Clone, Copy, Debug)]
struct PendingRidge {
    facet: FacetId,
    skip: usize,
}

/// Transient table of half-ridges awaiting their twin.
///
/// Must drain to empty by the end of every horizon walk; a leftover entry
/// means the walk produced an unpaired ridge, which is a bookkeeping bug.
#[derive(Clone, Debug, Default)]
pub struct RidgeMatcher {
    pending: FastHashMap<u64, SmallBuffer<PendingRidge, 2>>,
}

impl RidgeMatcher {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every ridge of a newly created facet except the one across
    /// `skip` (already wired to a retained facet), pairing it with any
    /// sibling facet that registered the same ridge earlier.
    pub fn match_ridges<T: CoordinateScalar, const D: usize>(
        &mut self,
        store: &mut FacetStore<T, D>,
        facet: FacetId,
        skip: usize,
    ) {
        let vertices = store[facet].vertices;
        let mut vertex_hashes = [0_u64; D];
        let mut ridge_hash = 0_u64;
        for v in 0..D {
            if v != skip {
                let h = mix(vertices[v]);
                vertex_hashes[v] = h;
                ridge_hash ^= h;
            }
        }
        for v in 0..D {
            if v == skip {
                continue;
            }
            let key = ridge_hash ^ vertex_hashes[v];
            let twin = self.pending.get_mut(&key).and_then(|bucket| {
                bucket
                    .iter()
                    .position(|cand| same_ridge(store, cand.facet, cand.skip, facet, v))
                    .map(|i| bucket.swap_remove(i))
            });
            match twin {
                Some(twin) => {
                    if self
                        .pending
                        .get(&key)
                        .is_some_and(|bucket| bucket.is_empty())
                    {
                        self.pending.remove(&key);
                    }
                    store[twin.facet].neighbours[twin.skip] = facet;
                    store[facet].neighbours[v] = twin.facet;
                }
                None => {
                    self.pending
                        .entry(key)
                        .or_default()
                        .push(PendingRidge { facet, skip: v });
                }
            }
        }
    }

    /// Whether every registered ridge has found its twin.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops any pending entries.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Exact comparison of the two ridges' vertex sets, each side excluding its
/// own single vertex. Guards against hash collisions.
fn same_ridge<T: CoordinateScalar, const D: usize>(
    store: &FacetStore<T, D>,
    a_facet: FacetId,
    a_skip: usize,
    b_facet: FacetId,
    b_skip: usize,
) -> bool {
    let a = &store[a_facet].vertices;
    let b = &store[b_facet].vertices;
    for (i, &p) in a.iter().enumerate() {
        if i == a_skip {
            continue;
        }
        let mut found = false;
        for (j, &q) in b.iter().enumerate() {
            if j != b_skip && q == p {
                found = true;
                break;
            }
        }
        if !found {
            return false;
        }
    }
    true
}

/// Avalanche-mixed identity hash of a point index, so that XOR combinations
/// of distinct vertex sets rarely collide.
fn mix(id: PointId) -> u64 {
    let mut h = (id as u64).wrapping_add(0x9e37_79b9_7f4a_7c15);
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^= h >> 33;
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::matrix::Hyperplane;

    fn dummy_plane() -> Hyperplane<f64, 3> {
        Hyperplane::new([0.0, 0.0, 1.0], 0.0)
    }

    #[test]
    fn sibling_facets_are_wired_mutually() {
        // Two triangles sharing the ridge {9, 2}: apex is vertex 9 at
        // position 0 in both, so only positions 1 and 2 register ridges.
        let mut store: FacetStore<f64, 3> = FacetStore::new();
        let a = store.push_simplex_facet([9, 2, 3], [100, 100, 100], dummy_plane());
        let b = store.push_simplex_facet([9, 4, 2], [100, 100, 100], dummy_plane());

        let mut matcher = RidgeMatcher::new();
        matcher.match_ridges(&mut store, a, 0);
        assert!(!matcher.is_empty());
        matcher.match_ridges(&mut store, b, 0);

        // ridge {9, 2} of `a` excludes vertex 3 (position 2); of `b`,
        // vertex 4 (position 1)
        assert_eq!(store[a].neighbours()[2], b);
        assert_eq!(store[b].neighbours()[1], a);
        // the unmatched ridges {9, 3} and {9, 4} stay pending
        assert!(!matcher.is_empty());
        matcher.clear();
        assert!(matcher.is_empty());
    }

    #[test]
    fn disjoint_ridges_do_not_pair() {
        let mut store: FacetStore<f64, 3> = FacetStore::new();
        let a = store.push_simplex_facet([9, 2, 3], [100, 100, 100], dummy_plane());
        let b = store.push_simplex_facet([9, 4, 5], [100, 100, 100], dummy_plane());

        let mut matcher = RidgeMatcher::new();
        matcher.match_ridges(&mut store, a, 0);
        matcher.match_ridges(&mut store, b, 0);
        assert_eq!(store[a].neighbours(), &[100, 100, 100]);
        assert_eq!(store[b].neighbours(), &[100, 100, 100]);
    }
}
