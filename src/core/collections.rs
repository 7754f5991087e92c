//! Optimized collection aliases and index types.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

/// Fast non-cryptographic `HashMap` for internal id-keyed mappings.
///
/// Not DoS-resistant; only ever used with internal, trusted keys.
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Fast non-cryptographic `HashSet` counterpart of [`FastHashMap`].
pub type FastHashSet<V> = FxHashSet<V>;

/// Small buffer that stays on the stack for up to `N` elements.
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Index of a point in the caller-owned point slice.
///
/// The engine never copies point coordinates except into scratch rows; every
/// container (pool, outside lists, coplanar lists, facet vertex arrays) holds
/// these indices.
pub type PointId = usize;

/// Stable handle of a facet slot in the facet store.
///
/// Handles are plain indices into a growable array so that compaction only
/// ever rewrites integers, never addresses. A slot may be recycled after its
/// facet is logically removed.
pub type FacetId = usize;

/// Placeholder for a neighbour slot that has not been wired yet.
///
/// Every slot of a freshly created facet other than the one across the apex
/// is rewritten by ridge matching before the enclosing horizon walk ends.
pub(crate) const UNLINKED: FacetId = usize::MAX;
