// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Normalization invariant checker.
//!
//! Brute force on purpose: O(V²) and O(V·E) scans that share no code with
//! the rules they check.

use std::collections::BTreeSet;

use wire_core::{ClusterId, EdgeId, GraphState, Ownership, VertexId};

/// One broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Two vertices within tolerance of each other.
    Coincident(VertexId, VertexId),
    /// A vertex lies on the open segment of an edge it is not an endpoint of.
    OnSegment {
        /// Offending vertex.
        vertex: VertexId,
        /// Edge it sits on.
        edge: EdgeId,
    },
    /// A free degree-2 vertex between two collinear, opposite edges.
    Collapsible(VertexId),
    /// A component with edges has a vertex without a cluster id.
    MissingCluster(VertexId),
    /// An edgeless vertex still carries a cluster id.
    EdgelessWithCluster(VertexId),
    /// One component carries several cluster ids.
    MixedClusters(Vec<ClusterId>),
    /// Two components carry the same cluster id.
    SharedCluster(ClusterId),
    /// A drag-only tag outlived its session.
    DetachedPin(VertexId),
}

/// Every invariant violation in `state`, given the point tolerance `eps`.
pub fn violations(state: &GraphState, eps: f64) -> Vec<Violation> {
    let mut out = Vec::new();
    let vertices: Vec<_> = state.vertices().copied().collect();
    for (i, a) in vertices.iter().enumerate() {
        for b in &vertices[i + 1..] {
            if a.point.approx_eq(b.point, eps) {
                out.push(Violation::Coincident(a.id, b.id));
            }
        }
    }
    for edge in state.edges() {
        let Some((pa, pb)) = state.segment(edge.id) else { continue };
        for v in &vertices {
            if edge.touches(v.id) || v.point.approx_eq(pa, eps) || v.point.approx_eq(pb, eps) {
                continue;
            }
            if GraphState::is_point_on_segment(v.point, pa, pb, eps) {
                out.push(Violation::OnSegment { vertex: v.id, edge: edge.id });
            }
        }
    }
    for v in &vertices {
        if state.ownership(v.id).is_free() && is_collapsible(state, v.id, eps) {
            out.push(Violation::Collapsible(v.id));
        }
        if matches!(state.ownership(v.id), Ownership::DetachedPin { .. }) {
            out.push(Violation::DetachedPin(v.id));
        }
    }
    let mut seen: BTreeSet<ClusterId> = BTreeSet::new();
    for comp in state.components() {
        if comp.is_edgeless() {
            for v in &comp.vertices {
                if state.vertex(*v).is_some_and(|r| r.cluster.is_some()) {
                    out.push(Violation::EdgelessWithCluster(*v));
                }
            }
            continue;
        }
        let mut ids: BTreeSet<ClusterId> = BTreeSet::new();
        for v in &comp.vertices {
            match state.vertex(*v).and_then(|r| r.cluster) {
                Some(c) => {
                    ids.insert(c);
                }
                None => out.push(Violation::MissingCluster(*v)),
            }
        }
        if ids.len() > 1 {
            out.push(Violation::MixedClusters(ids.iter().copied().collect()));
        }
        for c in ids {
            if !seen.insert(c) {
                out.push(Violation::SharedCluster(c));
            }
        }
    }
    out
}

fn is_collapsible(state: &GraphState, v: VertexId, eps: f64) -> bool {
    let neighbors: Vec<VertexId> = state
        .incident_edges(v)
        .filter_map(|e| state.edge(e).and_then(|edge| edge.other(v)))
        .collect();
    let [a, b] = neighbors.as_slice() else { return false };
    if a == b {
        return false;
    }
    let (Some(pv), Some(pa), Some(pb)) = (state.point(v), state.point(*a), state.point(*b)) else {
        return false;
    };
    let (da, db) = (pa.sub(pv), pb.sub(pv));
    da.cross(db).abs() <= eps * da.length().max(db.length()).max(1.0) && da.dot(db) < 0.0
}

/// Panics with the full list when `state` breaks any invariant.
#[track_caller]
pub fn assert_normalized(state: &GraphState, eps: f64) {
    let found = violations(state, eps);
    assert!(found.is_empty(), "graph is not normalized: {found:#?}");
}
