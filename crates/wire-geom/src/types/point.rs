// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::fmt;

/// A location in the schematic plane.
///
/// Coordinates are in document units; the engine never assumes a unit, only
/// the tolerance supplied by the active geometry policy.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2 {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point2 {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a point from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the point translated by `v`.
    #[must_use]
    pub fn offset(self, v: Vec2) -> Self {
        Self::new(self.x + v.dx, self.y + v.dy)
    }

    /// Returns the vector pointing from `origin` to `self`.
    #[must_use]
    pub fn sub(self, origin: Self) -> Vec2 {
        Vec2::new(self.x - origin.x, self.y - origin.y)
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.sub(other).length()
    }

    /// Returns `true` when both coordinates are within `tolerance` of `other`.
    #[must_use]
    pub fn approx_eq(self, other: Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }

    /// Returns the coordinate along `axis`.
    #[must_use]
    pub fn coord(self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Returns a copy with the coordinate along `axis` replaced.
    #[must_use]
    pub fn with_coord(self, axis: Axis, value: f64) -> Self {
        match axis {
            Axis::Horizontal => Self::new(value, self.y),
            Axis::Vertical => Self::new(self.x, value),
        }
    }
}

impl fmt::Display for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A displacement in the schematic plane.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    /// Horizontal component.
    pub dx: f64,
    /// Vertical component.
    pub dy: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    /// Creates a vector from its components.
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.dx.hypot(self.dy)
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.dx * other.dx + self.dy * other.dy
    }

    /// 2D cross product (z component of the 3D cross product).
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.dx * other.dy - self.dy * other.dx
    }

    /// Returns `true` when both components are within `tolerance` of zero.
    #[must_use]
    pub fn is_zero(self, tolerance: f64) -> bool {
        self.dx.abs() <= tolerance && self.dy.abs() <= tolerance
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len <= f64::EPSILON {
            return None;
        }
        Some(Self::new(self.dx / len, self.dy / len))
    }

    /// Returns the component along `axis`.
    #[must_use]
    pub fn component(self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.dx,
            Axis::Vertical => self.dy,
        }
    }
}

/// Orientation of an axis-aligned segment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Constant `y`, varying `x`.
    Horizontal,
    /// Constant `x`, varying `y`.
    Vertical,
}

impl Axis {
    /// Classifies the segment `a`–`b`.
    ///
    /// Returns `None` for diagonal segments and for degenerate segments whose
    /// endpoints coincide within `tolerance`.
    #[must_use]
    pub fn of(a: Point2, b: Point2, tolerance: f64) -> Option<Self> {
        let same_x = (a.x - b.x).abs() <= tolerance;
        let same_y = (a.y - b.y).abs() <= tolerance;
        match (same_x, same_y) {
            (true, true) | (false, false) => None,
            (false, true) => Some(Self::Horizontal),
            (true, false) => Some(Self::Vertical),
        }
    }

    /// The other axis.
    #[must_use]
    pub fn perpendicular(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}
