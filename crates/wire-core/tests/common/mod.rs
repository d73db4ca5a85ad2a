// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use wire_core::geom::Point2;
use wire_core::{EdgeId, GraphState, VertexId};

/// Tolerance of the default engine configuration.
pub const EPS: f64 = 1e-6;

pub fn p(x: f64, y: f64) -> Point2 {
    Point2::new(x, y)
}

/// Every vertex point, sorted by x then y.
pub fn sorted_points(state: &GraphState) -> Vec<Point2> {
    let mut out: Vec<Point2> = state.vertices().map(|v| v.point).collect();
    out.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    out
}

pub fn vertex_at(state: &GraphState, x: f64, y: f64) -> Option<VertexId> {
    state.vertex_at(p(x, y), EPS)
}

/// First edge joining the vertices at `a` and `b`, in either direction.
pub fn edge_between(state: &GraphState, a: Point2, b: Point2) -> Option<EdgeId> {
    state.edges().map(|e| e.id).find(|e| {
        state.segment(*e).is_some_and(|(s, t)| {
            (s.approx_eq(a, EPS) && t.approx_eq(b, EPS))
                || (s.approx_eq(b, EPS) && t.approx_eq(a, EPS))
        })
    })
}
