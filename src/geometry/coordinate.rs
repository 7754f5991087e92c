//! Scalar trait for hull coordinates.
//!
//! All geometric computation in this crate is generic over a floating-point
//! coordinate type. [`CoordinateScalar`] bundles the `num_traits` capabilities
//! the engine needs: full float semantics (`Float`), the core subset used by
//! `ordered_float` ranking keys (`FloatCore`), and in-place arithmetic for the
//! scratch-matrix kernels (`NumAssign`).

use num_traits::float::FloatCore;
use num_traits::{Float, NumAssign, NumCast};
use std::fmt::Debug;

/// Trait alias for coordinate scalar types (`f32`, `f64`, and compatible
/// third-party floats).
///
/// # Examples
///
/// ```rust
/// use ndhull::geometry::coordinate::CoordinateScalar;
///
/// fn norm_sq<T: CoordinateScalar>(v: &[T]) -> T {
///     v.iter().fold(T::zero(), |acc, &x| acc + x * x)
/// }
///
/// assert_eq!(norm_sq(&[3.0_f64, 4.0]), 25.0);
/// ```
pub trait CoordinateScalar:
    Float + FloatCore + NumAssign + Default + Debug + 'static
{
}

impl<T> CoordinateScalar for T where T: Float + FloatCore + NumAssign + Default + Debug + 'static {}

/// Exact conversion of a small structural count (at most `D + 1`) into the
/// scalar type.
///
/// Dimension-sized counts are exactly representable in every supported float,
/// so a failed cast is a logic error, not a runtime condition.
pub(crate) fn scalar_from_count<T: CoordinateScalar>(n: usize) -> T {
    <T as NumCast>::from(n).unwrap_or_else(|| unreachable!("count {n} not representable as scalar"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_from_count_is_exact_for_small_dimensions() {
        for n in 0..32_usize {
            let x: f64 = scalar_from_count(n);
            assert_eq!(x, n as f64);
            let y: f32 = scalar_from_count(n);
            assert_eq!(y, n as f32);
        }
    }
}
