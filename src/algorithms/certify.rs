//! Independent post-hoc certification of a constructed hull.
//!
//! Follows the program-checking approach of Mehlhorn et al., "Checking
//! geometric programs or verification of geometric structures" (SoCG 1996):
//! instead of trusting the construction, verify the output directly.
//!
//! Three checks run in sequence:
//!
//! 1. local convexity at every ridge: no neighbour's opposite vertex may
//!    lie strictly beyond a facet's hyperplane,
//! 2. interior containment: the fixed interior reference point must be
//!    strictly on the negative side of every facet,
//! 3. an interior ray cast: a ray from the interior point through the first
//!    facet's centroid must not re-enter the hull through any other facet;
//!    this catches self-intersections that local convexity alone misses.
//!
//! The ray cast solves one dense linear system per facet. Its pivot guard is
//! deliberately strict: a pivot within tolerance means the facet's vertex
//! matrix is too ill-conditioned to certify, and the check fails
//! conservatively rather than trusting a near-singular solve.

use crate::algorithms::quick_hull::QuickHull;
use crate::core::collections::FacetId;
use crate::geometry::coordinate::{scalar_from_count, CoordinateScalar};
use num_traits::Float;

impl<'p, T: CoordinateScalar, const D: usize> QuickHull<'p, T, D> {
    /// Certifies convexity and containment of the constructed boundary.
    ///
    /// Valid after `create_initial_simplex` (where it is debug-asserted) and
    /// after `create_convex_hull`. Returns `false` (with a `debug!`-level
    /// reason) on the first violated property.
    #[must_use]
    pub fn check(&self) -> bool {
        let store = self.store();
        debug_assert!(D < store.len());
        debug_assert!(store.free_is_empty());

        for (f, _) in store.iter() {
            if !self.check_local_convexity(f) {
                tracing::debug!(facet = f, "local convexity violated at a ridge");
                return false;
            }
        }

        let points = self.points();
        let inner = self.interior_point();
        let first = &store[0];
        if !(first.distance(inner) < T::zero()) {
            tracing::debug!("interior point is not inside the first facet");
            return false;
        }

        // ray from the interior point through the first facet's centroid
        let dim = scalar_from_count::<T>(D);
        let mut ray = [T::zero(); D];
        for &v in first.vertices() {
            for c in 0..D {
                ray[c] += points[v].coords()[c];
            }
        }
        for c in 0..D {
            ray[c] /= dim;
            ray[c] -= inner[c];
        }
        let mut along = T::zero();
        for c in 0..D {
            along += ray[c] * first.normal()[c];
        }
        if !(T::zero() < along) {
            tracing::debug!("interior ray is parallel to its target facet");
            return false;
        }

        for f in 1..store.len() {
            let facet = &store[f];
            let numerator = facet.distance(inner);
            if !(numerator < T::zero()) {
                tracing::debug!(facet = f, "interior point is not inside every facet");
                return false;
            }
            let mut denominator = T::zero();
            for c in 0..D {
                denominator += ray[c] * facet.normal()[c];
            }
            if !(T::zero() < denominator) {
                // ray parallel to, or directed away from, this hyperplane
                continue;
            }
            if self.ray_hits_facet(f, &ray, numerator / denominator) {
                tracing::debug!(facet = f, "interior ray re-enters the hull");
                return false;
            }
        }
        true
    }

    /// Whether the interior ray, scaled by `-ratio`, pierces facet `f` inside
    /// its vertex simplex. Solves for the barycentric coordinates of the
    /// hyperplane intersection with Gaussian elimination. A near-singular
    /// solve counts as a hit so that the surrounding check fails
    /// conservatively instead of trusting an ill-conditioned answer.
    fn ray_hits_facet(&self, f: FacetId, ray: &[T; D], ratio: T) -> bool {
        let store = self.store();
        let points = self.points();
        let inner = self.interior_point();
        let eps = self.epsilon();
        let facet = &store[f];
        let dim = scalar_from_count::<T>(D);

        let mut intersection = [T::zero(); D];
        for c in 0..D {
            intersection[c] = ray[c] * -ratio + inner[c];
        }

        // columns of the system are the facet's vertices
        let mut g = [[T::zero(); D]; D];
        let mut rhs = intersection;
        for (v, &p) in facet.vertices().iter().enumerate() {
            let coords = points[p].coords();
            for r in 0..D {
                g[r][v] = coords[r];
            }
        }

        // conditioning: translate the facet centroid to the origin, then
        // shift each row off the origin by its own coordinate extent so no
        // vertex coincides with the origin
        let mut shift = [T::zero(); D];
        for r in 0..D {
            let mut sum = T::zero();
            for v in 0..D {
                sum += g[r][v];
            }
            shift[r] = -sum / dim;
        }
        for r in 0..D {
            for v in 0..D {
                g[r][v] += shift[r];
            }
            rhs[r] += shift[r];
            let mut lo = g[r][0];
            let mut hi = g[r][0];
            for v in 1..D {
                if g[r][v] < lo {
                    lo = g[r][v];
                }
                if hi < g[r][v] {
                    hi = g[r][v];
                }
            }
            let mut extent = hi - lo;
            if !(eps * dim < extent) {
                extent = T::one();
            }
            shift[r] = extent;
        }
        for r in 0..D {
            for v in 0..D {
                g[r][v] += shift[r];
            }
            rhs[r] += shift[r];
        }

        // Gaussian elimination with partial pivoting
        for i in 0..D {
            let mut pivot = i;
            let mut max = Float::abs(g[i][i]);
            for p in (i + 1)..D {
                let y = Float::abs(g[p][i]);
                if max < y {
                    max = y;
                    pivot = p;
                }
            }
            if !(eps < max) {
                // a vertex still coincides with the origin after the
                // conditioning above; refuse to certify from this solve
                tracing::debug!(facet = f, column = i, "ray-cast solve is near-singular");
                return true;
            }
            if pivot != i {
                g.swap(i, pivot);
                rhs.swap(i, pivot);
            }
            let dia = g[i][i];
            for j in (i + 1)..D {
                let factor = g[j][i] / dia;
                g[j][i] = T::zero();
                for k in (i + 1)..D {
                    let step = factor * g[i][k];
                    g[j][k] -= step;
                }
                let step = factor * rhs[i];
                rhs[j] -= step;
            }
        }

        // back substitution; a barycentric coordinate outside [0, 1] means
        // the intersection misses the facet's simplex
        for i in (0..D).rev() {
            let mut x = rhs[i];
            for j in (i + 1)..D {
                x -= g[i][j] * rhs[j];
            }
            x /= g[i][i];
            rhs[i] = x;
            if x < T::zero() || T::one() < x {
                return false;
            }
        }
        true
    }

    /// Local convexity at every ridge of facet `f`: a neighbour's opposite
    /// vertex must never lie strictly beyond this facet's hyperplane. The
    /// dihedral-angle cosine short-circuits coincident-normal pairs, which
    /// roundoff could otherwise misclassify.
    pub(crate) fn check_local_convexity(&self, f: FacetId) -> bool {
        let store = self.store();
        let points = self.points();
        let facet = &store[f];
        for &n in facet.neighbours() {
            let neighbour = &store[n];
            if facet.plane().cos_angle(neighbour.plane()) < T::one() {
                for v in 0..D {
                    if neighbour.neighbours()[v] == f {
                        // vertex v of the neighbour lies across the shared ridge
                        let d = facet.distance(points[neighbour.vertices()[v]].coords());
                        if self.epsilon() < d {
                            return false;
                        }
                        break;
                    }
                }
            }
        }
        true
    }
}
