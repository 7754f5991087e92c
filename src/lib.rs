//! # ndhull
//!
//! General-dimension incremental convex hull construction.
//!
//! Given a slice of `D`-dimensional points (`D >= 2`) and a numeric
//! tolerance, [`QuickHull`](algorithms::quick_hull::QuickHull) computes the
//! hull boundary as a set of `(D-1)`-dimensional facets with full mutual
//! adjacency and correctly oriented unit hyperplane equations, and can
//! independently certify the result.
//!
//! # Features
//!
//! - Arbitrary dimension via const generics, generic `f32`/`f64` coordinates
//! - Facet output with vertex indices, neighbour ids and hyperplane equations,
//!   sufficient to build a renderable or storable boundary
//! - A post-hoc certifier (local convexity, interior containment, interior
//!   ray cast) independent of the construction path
//! - Scratch-based numerics: determinants and QR run on workspace buffers
//!   allocated once per driver, with no per-call heap allocation
//!
//! # Basic usage
//!
//! ```rust
//! use ndhull::prelude::*;
//!
//! // the eight corners of the unit cube
//! let mut points: Vec<Point<f64, 3>> = Vec::new();
//! for x in 0..2 {
//!     for y in 0..2 {
//!         for z in 0..2 {
//!             points.push(Point::new([f64::from(x), f64::from(y), f64::from(z)]));
//!         }
//!     }
//! }
//!
//! let hull = QuickHull::build(&points, 1e-9).unwrap();
//! assert_eq!(hull.facet_count(), 12); // six faces, two triangles each
//! assert_eq!(hull.hull_vertices().len(), 8);
//! assert!(hull.check());
//!
//! for facet in hull.facets() {
//!     // every facet knows its vertices, neighbours and hyperplane
//!     assert_eq!(facet.vertices().len(), 3);
//!     assert_eq!(facet.neighbours().len(), 3);
//!     assert!(facet.distance(hull.interior_point()) < 0.0);
//! }
//! ```
//!
//! # Staged construction
//!
//! The one-shot [`QuickHull::build`](algorithms::quick_hull::QuickHull::build)
//! wraps the staged entry points used by embedding code (e.g. a mesh
//! builder): `add_points` → `get_affine_basis` → `create_initial_simplex` →
//! `create_convex_hull` → `check`. Degenerate input (fewer than `D + 1`
//! affinely independent points) is reported by `get_affine_basis` as a
//! structured error; the caller must pre-filter or perturb such input.
//!
//! # Tolerance
//!
//! Every near-zero decision (singularity pivots, outside/coplanar
//! classification, ranking admission) uses the caller-supplied non-negative
//! epsilon, fixed for the lifetime of a driver. There is no exact or
//! rational arithmetic fallback.
//!
//! # Non-goals
//!
//! Incremental updates after a hull is finalized, parallel construction, and
//! mesh/rendering/file-format concerns are all out of scope; consume the
//! facet output instead.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Core bookkeeping: facet storage, ranking, ridge matching.
pub mod core {
    pub mod collections;
    pub mod facet;
    pub mod ranking;
    pub mod ridge;

    pub use collections::*;
    pub use facet::*;
    pub use ranking::*;
    pub use ridge::*;
}

/// Geometric primitives and the scratch numeric kernel.
pub mod geometry {
    pub mod coordinate;
    pub mod matrix;
    pub mod point;

    pub use coordinate::*;
    pub use matrix::*;
    pub use point::*;
}

/// Hull construction and certification.
pub mod algorithms {
    pub mod certify;
    pub mod quick_hull;

    pub use quick_hull::*;
}

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::algorithms::quick_hull::{HullConstructionError, QuickHull};
    pub use crate::core::collections::{FacetId, FastHashMap, FastHashSet, PointId, SmallBuffer};
    pub use crate::core::facet::{Facet, FacetStore};
    pub use crate::core::ranking::RankingQueue;
    pub use crate::core::ridge::RidgeMatcher;
    pub use crate::geometry::coordinate::CoordinateScalar;
    pub use crate::geometry::matrix::{Hyperplane, Workspace};
    pub use crate::geometry::point::Point;
}
