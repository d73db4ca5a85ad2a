// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![forbid(unsafe_code)]
#![doc = r"Geometry primitives for schematic wiring.

This crate provides:
- Points and vectors in the schematic plane (`Point2`, `Vec2`, `Axis`).
- Axis-aligned bounding boxes (`Aabb`) used to scope re-normalization.
- Segment membership tests used by the edge splitter.
- The pluggable `GeometryPolicy` with a Manhattan grid and a free-angle
  implementation.

Design notes:
- `f64` throughout; all comparisons go through an explicit tolerance.
- No ambient state: every policy is a plain value handed to the engine.
"]

/// Snapping/tolerance policies.
pub mod policy;
/// Foundational geometric types.
pub mod types;

pub use policy::{FreeGeometry, GeometryPolicy, ManhattanGrid, RoutePreference};
pub use types::aabb::Aabb;
pub use types::point::{Axis, Point2, Vec2};
pub use types::segment::{point_on_segment, projection_parameter};
