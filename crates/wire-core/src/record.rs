// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graph record types: vertices and edges.
use wire_geom::Point2;

use crate::ident::{ClusterId, EdgeId, VertexId};

/// Materialised record for a single vertex.
///
/// Invariants (after the rule pipeline has run)
/// - No other vertex lies within tolerance of `point`.
/// - `cluster` is shared by every vertex of the connected component, and is
///   `None` for vertices without incident edges.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vertex {
    /// Stable identifier.
    pub id: VertexId,
    /// Location in schematic space.
    pub point: Point2,
    /// Net this vertex belongs to, if any.
    pub cluster: Option<ClusterId>,
}

/// Materialised record for a single (undirected) edge.
///
/// Edges carry no geometry of their own; the segment is derived from the
/// endpoints' points. `start`/`end` order has no meaning beyond storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    /// Stable identifier.
    pub id: EdgeId,
    /// First endpoint.
    pub start: VertexId,
    /// Second endpoint.
    pub end: VertexId,
}

impl Edge {
    /// Returns `true` if `v` is one of the endpoints.
    #[must_use]
    pub fn touches(&self, v: VertexId) -> bool {
        self.start == v || self.end == v
    }

    /// Returns the endpoint opposite to `v`, or `None` if `v` is not an endpoint.
    #[must_use]
    pub fn other(&self, v: VertexId) -> Option<VertexId> {
        if self.start == v {
            Some(self.end)
        } else if self.end == v {
            Some(self.start)
        } else {
            None
        }
    }

    /// Returns `true` if both edges join the same unordered vertex pair.
    #[must_use]
    pub fn same_endpoints(&self, other: &Self) -> bool {
        (self.start == other.start && self.end == other.end)
            || (self.start == other.end && self.end == other.start)
    }
}
