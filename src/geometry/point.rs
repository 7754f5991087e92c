//! A d-dimensional point.
//!
//! Points are plain coordinate arrays owned by the caller. The hull engine
//! only ever borrows a slice of them and copies individual coordinate rows
//! into its scratch workspace; it never takes ownership.

use serde::de::{SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;

/// A point in `D`-dimensional space.
///
/// # Examples
///
/// ```rust
/// use ndhull::geometry::point::Point;
///
/// let p = Point::new([1.0, 2.0, 3.0]);
/// assert_eq!(p.coords()[1], 2.0);
/// assert_eq!(p[2], 3.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<T, const D: usize> {
    coords: [T; D],
}

impl<T, const D: usize> Point<T, D> {
    /// Creates a point from its coordinate array.
    #[must_use]
    pub const fn new(coords: [T; D]) -> Self {
        Self { coords }
    }

    /// The coordinate array.
    #[must_use]
    pub const fn coords(&self) -> &[T; D] {
        &self.coords
    }
}

impl<T, const D: usize> From<[T; D]> for Point<T, D> {
    fn from(coords: [T; D]) -> Self {
        Self::new(coords)
    }
}

impl<T, const D: usize> Index<usize> for Point<T, D> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        &self.coords[i]
    }
}

// Serde support is hand-written: `serde` does not derive impls for
// arbitrary-length const-generic arrays, so points serialize as a
// D-element tuple of coordinates.
impl<T, const D: usize> Serialize for Point<T, D>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeTuple;
        let mut tuple = serializer.serialize_tuple(D)?;
        for coord in &self.coords {
            tuple.serialize_element(coord)?;
        }
        tuple.end()
    }
}

impl<'de, T, const D: usize> Deserialize<'de> for Point<T, D>
where
    T: Deserialize<'de> + Copy + Default,
{
    fn deserialize<De>(deserializer: De) -> Result<Self, De::Error>
    where
        De: serde::Deserializer<'de>,
    {
        struct CoordVisitor<T, const D: usize>(PhantomData<T>);

        impl<'de, T, const D: usize> Visitor<'de> for CoordVisitor<T, D>
        where
            T: Deserialize<'de> + Copy + Default,
        {
            type Value = Point<T, D>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "a sequence of {D} coordinates")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut coords = [T::default(); D];
                for (i, slot) in coords.iter_mut().enumerate() {
                    *slot = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                }
                Ok(Point::new(coords))
            }
        }

        deserializer.deserialize_tuple(D, CoordVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_accessors() {
        let p = Point::new([1.5, -2.0]);
        assert_eq!(p.coords(), &[1.5, -2.0]);
        assert_eq!(p[0], 1.5);
        assert_eq!(Point::from([1.5, -2.0]), p);
    }

    #[test]
    fn serde_round_trip() {
        let p: Point<f64, 4> = Point::new([0.0, 1.0, -2.5, 1e-9]);
        let json = serde_json::to_string(&p).unwrap();
        let back: Point<f64, 4> = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn serde_rejects_short_sequences() {
        let result: Result<Point<f64, 3>, _> = serde_json::from_str("[1.0, 2.0]");
        assert!(result.is_err());
    }
}
