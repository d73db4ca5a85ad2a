// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Geometry policies: snapping grid, tolerance and routing shape.
//!
//! Every point comparison made by the wiring engine goes through the active
//! policy's tolerance. Policies are plain values; the engine owns one behind a
//! `Box<dyn GeometryPolicy>`.

use core::fmt;

use crate::types::point::{Axis, Point2};

/// Which leg an L-shaped route draws first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RoutePreference {
    /// Leave the start point horizontally, then turn vertical.
    #[default]
    HorizontalFirst,
    /// Leave the start point vertically, then turn horizontal.
    VerticalFirst,
}

/// Pluggable geometry rules for the wiring graph.
pub trait GeometryPolicy: fmt::Debug {
    /// Tolerance used for every point comparison.
    fn epsilon(&self) -> f64;

    /// Snaps a user-supplied point onto the policy's grid.
    fn snap(&self, p: Point2) -> Point2;

    /// Returns `true` when `a` and `b` denote the same location.
    fn same_point(&self, a: Point2, b: Point2) -> bool {
        a.approx_eq(b, self.epsilon())
    }

    /// Returns `true` if a straight wire between `a` and `b` is allowed.
    fn is_valid_segment(&self, a: Point2, b: Point2) -> bool;

    /// Intermediate corner points for a wire from `from` to `to`.
    ///
    /// The endpoints themselves are not included. An empty result means the
    /// two points can be joined by a single straight segment.
    fn route(&self, from: Point2, to: Point2, preference: RoutePreference) -> Vec<Point2>;
}

/// Orthogonal (Manhattan) wiring on a square grid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ManhattanGrid {
    step: f64,
    epsilon: f64,
}

impl ManhattanGrid {
    /// Creates a grid with spacing `step` and comparison tolerance `epsilon`.
    ///
    /// A non-positive `step` disables snapping; a negative `epsilon` is
    /// treated as zero.
    #[must_use]
    pub fn new(step: f64, epsilon: f64) -> Self {
        Self { step, epsilon: epsilon.max(0.0) }
    }

    /// Grid spacing.
    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    fn snap_coord(&self, v: f64) -> f64 {
        if self.step > 0.0 {
            (v / self.step).round() * self.step
        } else {
            v
        }
    }
}

impl Default for ManhattanGrid {
    fn default() -> Self {
        Self::new(1.0, 1e-6)
    }
}

impl GeometryPolicy for ManhattanGrid {
    fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn snap(&self, p: Point2) -> Point2 {
        Point2::new(self.snap_coord(p.x), self.snap_coord(p.y))
    }

    fn is_valid_segment(&self, a: Point2, b: Point2) -> bool {
        Axis::of(a, b, self.epsilon).is_some()
    }

    fn route(&self, from: Point2, to: Point2, preference: RoutePreference) -> Vec<Point2> {
        if self.same_point(from, to) || Axis::of(from, to, self.epsilon).is_some() {
            return Vec::new();
        }
        let corner = match preference {
            RoutePreference::HorizontalFirst => Point2::new(to.x, from.y),
            RoutePreference::VerticalFirst => Point2::new(from.x, to.y),
        };
        vec![corner]
    }
}

/// Free-angle wiring: no snapping, any non-degenerate segment is valid and
/// routes are always direct.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FreeGeometry {
    epsilon: f64,
}

impl FreeGeometry {
    /// Creates a free-angle policy with comparison tolerance `epsilon`.
    #[must_use]
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon: epsilon.max(0.0) }
    }
}

impl Default for FreeGeometry {
    fn default() -> Self {
        Self::new(1e-6)
    }
}

impl GeometryPolicy for FreeGeometry {
    fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn snap(&self, p: Point2) -> Point2 {
        p
    }

    fn is_valid_segment(&self, a: Point2, b: Point2) -> bool {
        !self.same_point(a, b)
    }

    fn route(&self, _from: Point2, _to: Point2, _preference: RoutePreference) -> Vec<Point2> {
        Vec::new()
    }
}
