// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use tracing::{debug, trace};
use wire_geom::{projection_parameter, Aabb};

use crate::graph::GraphState;
use crate::ident::{EdgeId, VertexId};
use crate::rule::{ResolutionContext, Rule};

/// Splits every edge that has another vertex lying on its open segment into
/// a chain of sub-edges through those vertices.
///
/// Only edges whose bounds meet the neighborhood are examined. The edge set
/// is snapshotted first because the chain replaces edges in place. Vertices
/// stacked on the same split point are chained once; no zero-length edge is
/// emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitEdgesAtPassingVertices;

impl Rule for SplitEdgesAtPassingVertices {
    fn name(&self) -> &'static str {
        "split_edges_at_passing_vertices"
    }

    fn apply(&self, state: &mut GraphState, ctx: &mut ResolutionContext<'_>) {
        let eps = ctx.epsilon();
        let region = ctx.neighborhood.inflate(eps);
        let snapshot: Vec<EdgeId> = state
            .edges()
            .filter(|e| {
                state.segment(e.id).is_some_and(|(a, b)| Aabb::new(a, b).overlaps(&region))
            })
            .map(|e| e.id)
            .collect();

        let mut split = 0usize;
        for edge_id in snapshot {
            let Some(edge) = state.edge(edge_id).copied() else { continue };
            let Some((a, b)) = state.segment(edge_id) else { continue };
            let bounds = Aabb::new(a, b).inflate(eps);
            let mut passing: Vec<(f64, VertexId)> = state
                .vertices_in(bounds)
                .filter(|v| !edge.touches(v.id))
                .filter(|v| !ctx.geometry.same_point(v.point, a))
                .filter(|v| !ctx.geometry.same_point(v.point, b))
                .filter(|v| GraphState::is_point_on_segment(v.point, a, b, eps))
                .map(|v| (projection_parameter(v.point, a, b), v.id))
                .collect();
            if passing.is_empty() {
                continue;
            }
            passing.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));
            trace!(edge = %edge_id, count = passing.len(), "splitting edge");

            state.remove_edge(edge_id);
            let mut chain = Vec::with_capacity(passing.len() + 1);
            let (mut prev, mut prev_at) = (edge.start, a);
            for (_, mid) in &passing {
                ctx.epicenter.insert(*mid);
                let Some(mid_at) = state.point(*mid) else { continue };
                if ctx.geometry.same_point(prev_at, mid_at) {
                    trace!(vertex = %mid, "stacked on previous split point; left for merge");
                    continue;
                }
                if let Some(e) = state.add_edge(prev, *mid) {
                    chain.push(e.id);
                }
                (prev, prev_at) = (*mid, mid_at);
            }
            if let Some(e) = state.add_edge(prev, edge.end) {
                chain.push(e.id);
            }
            if !chain.is_empty() {
                ctx.edge_policy.propagate_metadata(state, &[edge_id], &chain);
            }
            ctx.epicenter.insert(edge.start);
            ctx.epicenter.insert(edge.end);
            split += 1;
        }
        if split > 0 {
            debug!(split, "split edges at passing vertices");
        }
    }
}
