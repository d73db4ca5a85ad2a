// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Core geometry types used by the wiring engine (points, AABB, segments).
//!
//! Tolerance notes:
//! - Overlap and containment are inclusive on faces; a vertex sitting exactly
//!   on a neighbourhood boundary is inside it.
//! - Callers pass the tolerance explicitly; nothing here reads a global
//!   epsilon.

#[doc = "Axis-aligned bounding boxes in schematic space."]
pub mod aabb;
#[doc = "Points, vectors and axes."]
pub mod point;
#[doc = "Segment membership and projection helpers."]
pub mod segment;
