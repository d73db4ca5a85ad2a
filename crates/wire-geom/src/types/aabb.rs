// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::types::point::Point2;

/// Axis-aligned bounding box in schematic space.
///
/// Invariants:
/// - `min` components are less than or equal to `max` components.
/// - Containment and overlap are inclusive on faces.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    min: Point2,
    max: Point2,
}

impl Aabb {
    /// Constructs an AABB spanning two corners given in any order.
    #[must_use]
    pub fn new(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// A box that contains every finite point.
    #[must_use]
    pub fn everything() -> Self {
        Self {
            min: Point2::new(f64::MIN, f64::MIN),
            max: Point2::new(f64::MAX, f64::MAX),
        }
    }

    /// Returns the minimum corner.
    #[must_use]
    pub fn min(&self) -> Point2 {
        self.min
    }

    /// Returns the maximum corner.
    #[must_use]
    pub fn max(&self) -> Point2 {
        self.max
    }

    /// Returns `true` if `p` lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, p: Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Returns `true` if this AABB overlaps another (inclusive on faces).
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y)
    }

    /// Returns the union of two AABBs.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Grows the box so that it also contains `p`.
    #[must_use]
    pub fn including(&self, p: Point2) -> Self {
        self.union(&Self { min: p, max: p })
    }

    /// Inflates the box by a uniform margin `m` in all directions.
    ///
    /// Negative margins are clamped to zero.
    #[must_use]
    pub fn inflate(&self, m: f64) -> Self {
        let m = m.max(0.0);
        Self {
            min: Point2::new(self.min.x - m, self.min.y - m),
            max: Point2::new(self.max.x + m, self.max.y + m),
        }
    }

    /// Builds the minimal AABB that contains all `points`.
    ///
    /// Returns `None` when `points` is empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point2>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self { min: first, max: first }, |acc, p| acc.including(p)))
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn from_points_empty_is_none() {
        assert!(Aabb::from_points(Vec::new()).is_none());
    }

    #[test]
    fn face_touching_boxes_overlap() {
        let a = Aabb::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        let b = Aabb::new(Point2::new(10.0, 0.0), Point2::new(20.0, 5.0));
        assert!(a.overlaps(&b));
        assert!(a.contains(Point2::new(10.0, 10.0)));
    }

    #[test]
    fn inflate_grows_both_corners() {
        let a = Aabb::new(Point2::new(5.0, 5.0), Point2::new(0.0, 0.0)).inflate(2.0);
        assert_eq!(a.min(), Point2::new(-2.0, -2.0));
        assert_eq!(a.max(), Point2::new(7.0, 7.0));
    }
}
