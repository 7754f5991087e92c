//! General-dimension incremental convex hull construction.
//!
//! The driver implements the quickhull algorithm of Barber, Dobkin and
//! Huhdanpaa ("The Quickhull Algorithm for Convex Hulls", ACM TOMS 22(4),
//! 1996) for any dimension `D >= 2`:
//!
//! 1. an affine basis search picks `D + 1` affinely independent points by
//!    repeatedly orthonormalizing the current basis and stealing the point
//!    farthest from its affine span,
//! 2. the initial simplex turns the basis into `D + 1` mutually adjacent
//!    facets with a globally consistent orientation,
//! 3. the expansion loop repeatedly pops the facet with the globally farthest
//!    outside point, walks the set of facets visible from that point, and
//!    replaces them with a cone of new facets over the horizon ridges.
//!
//! Construction is single-threaded, synchronous and CPU-bound; all scratch
//! memory is owned by the driver and reused across iterations.

use crate::core::collections::{FacetId, FastHashSet, PointId};
use crate::core::facet::{Facet, FacetStore};
use crate::core::ranking::RankingQueue;
use crate::core::ridge::RidgeMatcher;
use crate::geometry::coordinate::{scalar_from_count, CoordinateScalar};
use crate::geometry::matrix::{Hyperplane, Workspace};
use crate::geometry::point::Point;
use num_traits::Float;
use thiserror::Error;

/// Errors reported while preparing hull construction.
///
/// Numerical near-singularity inside the matrix kernel is *not* an error: it
/// only changes algorithmic course (a candidate is skipped). Violations of
/// internal bookkeeping invariants are panics, not error values: they
/// indicate a bug, not bad input.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HullConstructionError {
    /// Fewer than `D + 1` affinely independent points were found. The caller
    /// must pre-filter or perturb the input, or relax the tolerance.
    #[error(
        "degenerate point set: found {independent} affinely independent points, need {required}"
    )]
    DegenerateInput {
        /// Affinely independent points found before the search stalled.
        independent: usize,
        /// Points required for a `D`-dimensional simplex (`D + 1`).
        required: usize,
    },
    /// The unassigned pool was empty when the basis search started.
    #[error("not enough points to seed the hull: have {actual}, need at least {required}")]
    InsufficientPoints {
        /// Points available.
        actual: usize,
        /// Points required (`D + 1`).
        required: usize,
    },
    /// `create_initial_simplex` was handed a basis of the wrong size.
    #[error("initial simplex needs exactly {required} basis points, got {actual}")]
    InvalidBasis {
        /// Basis points supplied.
        actual: usize,
        /// Basis points required (`D + 1`).
        required: usize,
    },
}

/// One suspended visit of the horizon walk: a visible facet and the next
/// neighbour position to inspect.
struct WalkFrame {
    facet: FacetId,
    vertex: usize,
}

/// Incremental convex hull driver over a caller-owned point slice.
///
/// The driver holds only indices into the slice; coordinates are copied
/// solely into the scratch workspace. One driver instance owns all mutable
/// construction state (facet store, ranking queue, point pool, visit sets)
/// exclusively; no concurrent access is supported.
///
/// # Examples
///
/// Square plus interior point, in the plane:
///
/// ```rust
/// use ndhull::prelude::*;
///
/// let points: Vec<Point<f64, 2>> = vec![
///     Point::new([0.0, 0.0]),
///     Point::new([1.0, 0.0]),
///     Point::new([1.0, 1.0]),
///     Point::new([0.0, 1.0]),
///     Point::new([0.5, 0.5]),
/// ];
/// let hull = QuickHull::build(&points, 1e-9).unwrap();
/// assert_eq!(hull.facet_count(), 4);
/// assert_eq!(hull.hull_vertices(), vec![0, 1, 2, 3]); // the center is interior
/// assert!(hull.check());
/// ```
///
/// Degenerate input is reported, not hulled:
///
/// ```rust
/// use ndhull::prelude::*;
///
/// let collinear: Vec<Point<f64, 2>> = vec![
///     Point::new([0.0, 0.0]),
///     Point::new([1.0, 1.0]),
///     Point::new([2.0, 2.0]),
/// ];
/// let err = QuickHull::build(&collinear, 1e-9).unwrap_err();
/// assert!(matches!(
///     err,
///     HullConstructionError::DegenerateInput { independent: 2, required: 3 }
/// ));
/// ```
#[derive(Debug)]
pub struct QuickHull<'p, T: CoordinateScalar, const D: usize> {
    points: &'p [Point<T, D>],
    eps: T,
    inner_point: [T; D],
    workspace: Workspace<T, D>,
    store: FacetStore<T, D>,
    ranking: RankingQueue<T>,
    pool: Vec<PointId>,
    ridges: RidgeMatcher,
    visited: FastHashSet<FacetId>,
    visible: FastHashSet<FacetId>,
}

impl<'p, T: CoordinateScalar, const D: usize> QuickHull<'p, T, D> {
    /// Creates a driver over a caller-owned point slice with a non-negative
    /// tolerance bounding every near-zero decision.
    ///
    /// # Panics
    ///
    /// Panics if `D < 2` or the tolerance is negative.
    #[must_use]
    pub fn new(points: &'p [Point<T, D>], eps: T) -> Self {
        assert!(D >= 2, "hull construction requires dimension >= 2");
        assert!(!(eps < T::zero()), "tolerance must be non-negative");
        Self {
            points,
            eps,
            inner_point: [T::zero(); D],
            workspace: Workspace::new(eps),
            store: FacetStore::new(),
            ranking: RankingQueue::new(eps),
            pool: Vec::new(),
            ridges: RidgeMatcher::new(),
            visited: FastHashSet::default(),
            visible: FastHashSet::default(),
        }
    }

    /// One-shot construction: enqueue every point, search the affine basis,
    /// build the initial simplex and run the expansion to completion.
    ///
    /// # Errors
    ///
    /// Returns [`HullConstructionError::DegenerateInput`] (or
    /// [`HullConstructionError::InsufficientPoints`]) when the point set does
    /// not span `D` dimensions within the tolerance.
    pub fn build(points: &'p [Point<T, D>], eps: T) -> Result<Self, HullConstructionError> {
        let mut hull = Self::new(points, eps);
        hull.add_points(0..points.len());
        let basis = hull.get_affine_basis()?;
        hull.create_initial_simplex(&basis)?;
        hull.create_convex_hull();
        Ok(hull)
    }

    /// Enqueues point indices into the unassigned pool. May be called any
    /// number of times before construction starts.
    pub fn add_points(&mut self, indices: impl IntoIterator<Item = PointId>) {
        for p in indices {
            debug_assert!(p < self.points.len());
            self.pool.push(p);
        }
    }

    /// The compile-time dimension.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        D
    }

    /// The configured tolerance.
    #[must_use]
    pub fn epsilon(&self) -> T {
        self.eps
    }

    /// The caller-owned point slice this driver indexes into.
    #[must_use]
    pub const fn points(&self) -> &'p [Point<T, D>] {
        self.points
    }

    /// The fixed interior reference point (the initial simplex centroid).
    /// Every facet keeps it strictly on its negative side.
    #[must_use]
    pub const fn interior_point(&self) -> &[T; D] {
        &self.inner_point
    }

    /// Number of live facets.
    #[must_use]
    pub fn facet_count(&self) -> usize {
        self.store.live_len()
    }

    pub(crate) fn store(&self) -> &FacetStore<T, D> {
        &self.store
    }

    /// Iterates the facet records. After construction the store is dense:
    /// every slot is a live boundary facet.
    pub fn facets(&self) -> impl Iterator<Item = &Facet<T, D>> {
        self.store.iter().map(|(_, facet)| facet)
    }

    /// A facet record by id.
    #[must_use]
    pub fn facet(&self, id: FacetId) -> &Facet<T, D> {
        &self.store[id]
    }

    /// Sorted, deduplicated indices of the points that ended up as hull
    /// vertices.
    #[must_use]
    pub fn hull_vertices(&self) -> Vec<PointId> {
        let mut ids: Vec<PointId> = self
            .facets()
            .flat_map(|facet| facet.vertices().iter().copied())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Cosine of the dihedral angle between two facets.
    #[must_use]
    pub fn cos_of_dihedral_angle(&self, f: FacetId, g: FacetId) -> T {
        self.store[f].plane.cos_angle(&self.store[g].plane)
    }

    /// Oriented hypervolume of the parallelotope spanned by the vectors from
    /// the last point of `simplex` to each preceding point; for fewer than
    /// `D + 1` points, the unsigned k-dimensional measure via the Gram
    /// determinant.
    pub fn hypervolume(&mut self, simplex: &[PointId]) -> T {
        let Some((&last, rest)) = simplex.split_last() else {
            return T::zero();
        };
        let rank = rest.len();
        debug_assert!(rank <= D);
        if rank == 0 {
            return T::zero();
        }
        let points = self.points;
        self.workspace.set_origin(points[last].coords());
        for (r, &p) in rest.iter().enumerate() {
            self.workspace.load_main_translated(r, points[p].coords());
        }
        if rank == D {
            self.workspace.determinant(D)
        } else {
            self.workspace.gram(rank);
            Float::sqrt(self.workspace.determinant_shadow(rank))
        }
    }

    /// Picks `D + 1` affinely independent points for the initial simplex,
    /// consuming them from the pool.
    ///
    /// Each round orthonormalizes the current basis (with its newest point as
    /// origin), projects every remaining candidate onto the orthogonal
    /// complement, and steals the candidate with the largest projected
    /// squared distance.
    ///
    /// # Errors
    ///
    /// Returns [`HullConstructionError::DegenerateInput`] carrying the number
    /// of independent points found when a round produces no candidate beyond
    /// the tolerance, or when the QR step reports near-dependence.
    pub fn get_affine_basis(&mut self) -> Result<Vec<PointId>, HullConstructionError> {
        debug_assert!(self.store.is_empty());
        let required = D + 1;
        if self.pool.is_empty() {
            return Err(HullConstructionError::InsufficientPoints {
                actual: 0,
                required,
            });
        }
        let mut basis = Vec::with_capacity(required);
        basis.push(self.pool.remove(0));
        if !self.steal_best(&mut basis) {
            tracing::debug!(independent = basis.len(), required, "affine basis search stalled");
            return Err(HullConstructionError::DegenerateInput {
                independent: basis.len(),
                required,
            });
        }
        // the arbitrary seed point goes back into the pool to be re-judged
        // against the basis grown from the point farthest from it
        let seed = basis.remove(0);
        self.pool.insert(0, seed);
        for _ in 0..D {
            if !self.steal_best(&mut basis) {
                tracing::debug!(independent = basis.len(), required, "affine basis search stalled");
                return Err(HullConstructionError::DegenerateInput {
                    independent: basis.len(),
                    required,
                });
            }
        }
        Ok(basis)
    }

    /// Moves the pool point farthest from the affine span of `basis` into the
    /// basis. Returns `false` when no candidate has a positive residual or
    /// the basis itself is near-dependent.
    fn steal_best(&mut self, basis: &mut Vec<PointId>) -> bool {
        debug_assert!(!basis.is_empty());
        let rank = basis.len() - 1;
        debug_assert!(rank < D);
        let points = self.points;
        self.workspace.set_origin(points[basis[rank]].coords());
        for (r, &b) in basis[..rank].iter().enumerate() {
            self.workspace.load_shadow_translated(r, points[b].coords());
        }
        if !self.workspace.orthonormalize(rank) {
            return false;
        }
        self.workspace.forward_transform(rank);
        let mut best_distance = T::zero();
        let mut best = None;
        for (i, &p) in self.pool.iter().enumerate() {
            let d = self.workspace.residual_norm_sq(points[p].coords(), rank);
            if best_distance < d {
                best_distance = d;
                best = Some(i);
            }
        }
        match best {
            Some(i) => {
                basis.push(self.pool.remove(i));
                true
            }
            None => false,
        }
    }

    /// Builds the first `D + 1` facets from an affine basis and partitions the
    /// remaining pool across them. Returns the signed hypervolume of the
    /// basis simplex, whose sign fixes the global orientation.
    ///
    /// # Errors
    ///
    /// Returns [`HullConstructionError::InvalidBasis`] unless exactly `D + 1`
    /// basis points are supplied.
    pub fn create_initial_simplex(
        &mut self,
        basis: &[PointId],
    ) -> Result<T, HullConstructionError> {
        if basis.len() != D + 1 {
            return Err(HullConstructionError::InvalidBasis {
                actual: basis.len(),
                required: D + 1,
            });
        }
        debug_assert!(self.store.is_empty());
        let points = self.points;
        let mut inner = [T::zero(); D];
        for &b in basis {
            for c in 0..D {
                inner[c] += points[b].coords()[c];
            }
        }
        let denominator = scalar_from_count::<T>(D + 1);
        for coord in &mut inner {
            *coord /= denominator;
        }
        self.inner_point = inner;

        let volume = self.hypervolume(basis);
        let swap = volume < T::zero();
        for omit in 0..=D {
            let mut vertices = [0_usize; D];
            let mut neighbours = [0_usize; D];
            let mut w = 0;
            for v in 0..=D {
                if v != omit {
                    vertices[w] = basis[v];
                    neighbours[w] = v;
                    w += 1;
                }
            }
            // an even permutation distance from the omitted vertex flips the
            // parity of the vertex order; compensate to keep all hyperplanes
            // pointing away from the centroid
            if swap == ((D - omit) % 2 == 0) {
                vertices.swap(0, D - 1);
                neighbours.swap(0, D - 1);
            }
            let plane = self.plane_for(&vertices);
            let f = self.store.push_simplex_facet(vertices, neighbours, plane);
            debug_assert_eq!(f, omit);
            let farthest = self.partition(f);
            self.ranking.rank(farthest, f);
        }
        // whatever the partition left behind is strictly interior
        self.pool.clear();
        debug_assert!(self.check());
        Ok(volume)
    }

    /// Runs the expansion loop to completion: while any facet has outside
    /// points, the globally farthest outside point becomes the next apex and
    /// the facets it sees are replaced by a cone of new facets over the
    /// horizon. Terminates with a dense, compacted facet array.
    ///
    /// # Panics
    ///
    /// Panics if internal bookkeeping is violated (a ranked facet that is not
    /// visible from its own outside point). This indicates a bug or an input
    /// the tolerance cannot separate, never a recoverable condition.
    pub fn create_convex_hull(&mut self) {
        debug_assert_eq!(self.store.len(), D + 1);
        debug_assert!(self.store.free_is_empty());
        let mut new_facets: Vec<FacetId> = Vec::new();
        let mut stack: Vec<WalkFrame> = Vec::new();
        while let Some(best) = self.ranking.peek_best() {
            let apex = {
                let facet = &mut self.store[best];
                debug_assert!(!facet.outside.is_empty());
                facet.outside.swap_remove(0)
            };
            let walked = self.process_visibles(&mut new_facets, &mut stack, best, apex);
            assert!(walked, "ranked facet {best} is not visible from its own outside point");
            self.visited.clear();
            self.visible.clear();
            debug_assert!(self.ridges.is_empty(), "horizon walk left unpaired ridges");
            for &f in &new_facets {
                debug_assert!(self.check_local_convexity(f));
                let farthest = self.partition(f);
                self.ranking.rank(farthest, f);
            }
            tracing::trace!(apex, created = new_facets.len(), "hull expanded");
            new_facets.clear();
            // points seen by no new facet are interior now
            self.pool.clear();
        }
        debug_assert!(self.ranking.is_empty());
        self.compactify();
        tracing::debug!(facets = self.store.len(), "hull construction finished");
    }

    /// Memoized traversal of the facets visible from the apex. Uses an
    /// explicit frame stack bounded by the number of visible facets rather
    /// than recursion bounded by the call stack.
    ///
    /// Returns `false` when the starting facet itself is not visible.
    fn process_visibles(
        &mut self,
        new_facets: &mut Vec<FacetId>,
        stack: &mut Vec<WalkFrame>,
        start: FacetId,
        apex: PointId,
    ) -> bool {
        debug_assert!(self.visited.is_empty() && self.visible.is_empty());
        debug_assert!(stack.is_empty());
        if !self.enter(start, apex, stack) {
            return false;
        }
        while let Some(top) = stack.len().checked_sub(1) {
            let f = stack[top].facet;
            let v = stack[top].vertex;
            if v == D {
                // fully surrounded by new facets now: this facet is interior
                stack.pop();
                self.ranking.unrank(f);
                self.store.release(f);
                continue;
            }
            stack[top].vertex += 1;
            let neighbour = self.store[f].neighbours[v];
            if !self.enter(neighbour, apex, stack) {
                // the ridge shared with this neighbour is on the horizon: the
                // replaced facet's vertices with `v` swapped for the apex
                // inherit its orientation
                let mut vertices = self.store[f].vertices;
                vertices[v] = apex;
                let plane = self.plane_for(&vertices);
                let created = self.store.add(vertices, v, neighbour, plane);
                new_facets.push(created);
                self.store.replace_neighbour(neighbour, f, created);
                self.ridges.match_ridges(&mut self.store, created, v);
            }
        }
        true
    }

    /// Visits a facet once: marks it, tests the apex against its hyperplane,
    /// and on visibility surrenders its outside points to the shared pool and
    /// suspends it on the walk stack. Repeat visits answer from the memo.
    fn enter(&mut self, f: FacetId, apex: PointId, stack: &mut Vec<WalkFrame>) -> bool {
        if !self.visited.insert(f) {
            return self.visible.contains(&f);
        }
        let points = self.points;
        let facet = &mut self.store[f];
        if !(T::zero() < facet.plane.distance(points[apex].coords())) {
            return false;
        }
        self.visible.insert(f);
        self.pool.append(&mut facet.outside);
        facet.coplanar.clear();
        stack.push(WalkFrame { facet: f, vertex: 0 });
        true
    }

    /// Classifies every pool point against one facet's hyperplane: strictly
    /// beyond the tolerance goes to the outside list (farthest point kept
    /// first), within the tolerance band to the coplanar list, and interior
    /// points stay pooled. Returns the largest outside distance found.
    pub(crate) fn partition(&mut self, f: FacetId) -> T {
        let pool = std::mem::take(&mut self.pool);
        let points = self.points;
        let eps = self.eps;
        let mut farthest = T::zero();
        let facet = &mut self.store[f];
        for p in pool {
            let d = facet.plane.distance(points[p].coords());
            if eps < d {
                facet.outside.push(p);
                if farthest < d {
                    farthest = d;
                    let last = facet.outside.len() - 1;
                    facet.outside.swap(0, last);
                }
            } else if !(d < -eps) {
                facet.coplanar.push(p);
            } else {
                self.pool.push(p);
            }
        }
        farthest
    }

    /// Supporting hyperplane through the given vertices, oriented against the
    /// interior reference point.
    fn plane_for(&mut self, vertices: &[PointId; D]) -> Hyperplane<T, D> {
        let points = self.points;
        let rows: [&[T; D]; D] = std::array::from_fn(|i| points[vertices[i]].coords());
        self.workspace.hyperplane_equation(rows, &self.inner_point)
    }

    /// Physical compaction: every freed slot is filled by relocating the last
    /// live record into it (highest freed slot first), rewriting the moved
    /// facet's id in its neighbours' adjacency lists and in the ranking
    /// index, then shrinking the store.
    fn compactify(&mut self) {
        let mut dead = self.store.take_free();
        dead.sort_unstable();
        for &slot in dead.iter().rev() {
            let last = self.store.len() - 1;
            if slot == last {
                self.store.pop_last();
                continue;
            }
            self.store.move_last_into(slot);
            let neighbours = self.store[slot].neighbours;
            for n in neighbours {
                self.store.replace_neighbour(n, last, slot);
            }
            self.ranking.migrate(last, slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPS: f64 = 1e-9;

    fn square_with_center() -> Vec<Point<f64, 2>> {
        vec![
            Point::new([0.0, 0.0]),
            Point::new([1.0, 0.0]),
            Point::new([1.0, 1.0]),
            Point::new([0.0, 1.0]),
            Point::new([0.5, 0.5]),
        ]
    }

    #[test]
    fn affine_basis_spans_the_square() {
        let points = square_with_center();
        let mut hull = QuickHull::new(&points, EPS);
        hull.add_points(0..points.len());
        let basis = hull.get_affine_basis().unwrap();
        assert_eq!(basis.len(), 3);
        // the interior point can never be farthest from any affine subspace
        assert!(!basis.contains(&4));
    }

    #[test]
    fn initial_simplex_orientation_is_definite() {
        let points = square_with_center();
        let mut hull = QuickHull::new(&points, EPS);
        hull.add_points(0..points.len());
        let basis = hull.get_affine_basis().unwrap();
        let volume = hull.create_initial_simplex(&basis).unwrap();
        assert!(volume != 0.0);
        assert_eq!(hull.facet_count(), 3);
        for facet in hull.facets() {
            assert!(facet.distance(hull.interior_point()) < 0.0);
        }
        assert!(hull.check());
    }

    #[test]
    fn empty_pool_is_rejected() {
        let points: Vec<Point<f64, 2>> = Vec::new();
        let mut hull = QuickHull::new(&points, EPS);
        assert_eq!(
            hull.get_affine_basis(),
            Err(HullConstructionError::InsufficientPoints {
                actual: 0,
                required: 3
            })
        );
    }

    #[test]
    fn wrong_basis_size_is_rejected() {
        let points = square_with_center();
        let mut hull = QuickHull::new(&points, EPS);
        hull.add_points(0..points.len());
        assert_eq!(
            hull.create_initial_simplex(&[0, 1]),
            Err(HullConstructionError::InvalidBasis {
                actual: 2,
                required: 3
            })
        );
    }

    #[test]
    fn repartition_without_pool_mutation_is_idempotent() {
        let points = square_with_center();
        let mut hull = QuickHull::new(&points, EPS);
        hull.add_points(0..points.len());
        let basis = hull.get_affine_basis().unwrap();
        hull.create_initial_simplex(&basis).unwrap();
        // every pool point is already assigned: a second partition pass over
        // the (empty) pool must move nothing
        let before: Vec<usize> = (0..hull.facet_count())
            .map(|f| hull.facet(f).outside_points().len())
            .collect();
        for f in 0..hull.facet_count() {
            let farthest = hull.partition(f);
            assert_eq!(farthest, 0.0);
        }
        let after: Vec<usize> = (0..hull.facet_count())
            .map(|f| hull.facet(f).outside_points().len())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn hypervolume_of_unit_triangle_is_signed() {
        let points = vec![
            Point::new([0.0, 0.0]),
            Point::new([1.0, 0.0]),
            Point::new([0.0, 1.0]),
        ];
        let mut hull = QuickHull::new(&points, EPS);
        // parallelotope volume: vectors from the last point to the others
        let ccw = hull.hypervolume(&[1, 2, 0]);
        let cw = hull.hypervolume(&[2, 1, 0]);
        assert_relative_eq!(ccw, -cw);
        assert_relative_eq!(ccw.abs(), 1.0);
    }

    #[test]
    fn hypervolume_of_partial_simplex_is_a_measure() {
        let points = vec![Point::new([0.0, 0.0, 0.0]), Point::new([0.0, 3.0, 4.0])];
        let mut hull = QuickHull::new(&points, EPS);
        // 1-measure of a single edge is its length, regardless of direction
        assert_relative_eq!(hull.hypervolume(&[1, 0]), 5.0);
        assert_relative_eq!(hull.hypervolume(&[0, 1]), 5.0);
        assert_eq!(hull.hypervolume(&[0]), 0.0);
        assert_eq!(hull.hypervolume(&[]), 0.0);
    }

    #[test]
    fn duplicate_points_are_never_stolen_into_the_basis() {
        let points = vec![
            Point::new([0.0, 0.0]),
            Point::new([0.0, 0.0]),
            Point::new([0.0, 0.0]),
        ];
        let mut hull = QuickHull::new(&points, EPS);
        hull.add_points(0..points.len());
        assert_eq!(
            hull.get_affine_basis(),
            Err(HullConstructionError::DegenerateInput {
                independent: 1,
                required: 3
            })
        );
    }
}
