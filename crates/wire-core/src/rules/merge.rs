// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use wire_geom::Point2;

use crate::graph::GraphState;
use crate::ident::VertexId;
use crate::rule::{ResolutionContext, Rule};

/// Fuses vertices that occupy the same point within tolerance.
///
/// Vertices are bucketed into square cells of side `epsilon`; each vertex
/// checks its own cell and the eight around it, so the scan is O(V)
/// amortized. Coincident groups are closed transitively.
///
/// A point holds at most one pin. The editing verbs refuse to stack pins, so
/// two pin vertices only meet here when a caller loads such a state
/// directly; the survivor then keeps its binding and the other binding is
/// dropped with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeCoincidentVertices;

type Cell = (i64, i64);

#[allow(clippy::cast_possible_truncation)]
fn cell_of(p: Point2, size: f64) -> Cell {
    ((p.x / size).floor() as i64, (p.y / size).floor() as i64)
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Groups of two or more coincident vertices, each ascending, ordered by
/// their lowest id.
fn coincident_groups(state: &GraphState, epsilon: f64) -> Vec<Vec<VertexId>> {
    let size = epsilon.max(f64::EPSILON);
    let verts: Vec<(VertexId, Point2)> = state.vertices().map(|v| (v.id, v.point)).collect();
    let mut buckets: FxHashMap<Cell, Vec<usize>> = FxHashMap::default();
    for (i, (_, p)) in verts.iter().enumerate() {
        buckets.entry(cell_of(*p, size)).or_default().push(i);
    }
    let mut parent: Vec<usize> = (0..verts.len()).collect();
    for (i, (_, p)) in verts.iter().enumerate() {
        let (cx, cy) = cell_of(*p, size);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = buckets.get(&(cx + dx, cy + dy)) else { continue };
                for &j in bucket {
                    if j <= i || !p.approx_eq(verts[j].1, epsilon) {
                        continue;
                    }
                    let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                    if ri != rj {
                        parent[ri.max(rj)] = ri.min(rj);
                    }
                }
            }
        }
    }
    let mut groups: BTreeMap<usize, Vec<VertexId>> = BTreeMap::new();
    for (i, (id, _)) in verts.iter().enumerate() {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().push(*id);
    }
    groups.into_values().filter(|g| g.len() > 1).collect()
}

impl Rule for MergeCoincidentVertices {
    fn name(&self) -> &'static str {
        "merge_coincident_vertices"
    }

    fn apply(&self, state: &mut GraphState, ctx: &mut ResolutionContext<'_>) {
        let groups = coincident_groups(state, ctx.epsilon());
        let mut fused = 0usize;
        for group in groups {
            let Some(survivor) = ctx.vertex_policy.prefer_survivor(state, &group) else {
                continue;
            };
            let mut binding = state.ownership(survivor).pin_binding();
            let mut absorbed = BTreeSet::new();
            for &member in &group {
                if member == survivor {
                    continue;
                }
                let tag = state.ownership(member);
                match (tag.pin_binding(), binding) {
                    (Some(theirs), Some(ours)) if theirs != ours => {
                        warn!(
                            %member,
                            %survivor,
                            owner = %theirs.0,
                            pin = %theirs.1,
                            "distinct pins share a point; binding dropped"
                        );
                    }
                    (Some(theirs), None) => {
                        binding = Some(theirs);
                        state.set_ownership(survivor, tag);
                    }
                    _ => {}
                }
                absorbed.insert(member);
            }
            if absorbed.is_empty() {
                continue;
            }
            for &member in &absorbed {
                rewire_onto(state, ctx, member, survivor, &absorbed);
                if let Some(removed) = state.remove_vertex(member) {
                    if state.vertex(survivor).is_some_and(|v| v.cluster.is_none()) {
                        state.set_cluster(survivor, removed.cluster);
                    }
                }
                ctx.epicenter.remove(&member);
                fused += 1;
            }
            ctx.epicenter.insert(survivor);
        }
        if fused > 0 {
            debug!(fused, "merged coincident vertices");
        }
    }
}

/// Moves every edge of `member` onto `survivor`, dropping edges that would
/// become self-loops.
fn rewire_onto(
    state: &mut GraphState,
    ctx: &mut ResolutionContext<'_>,
    member: VertexId,
    survivor: VertexId,
    absorbed: &BTreeSet<VertexId>,
) {
    let incident: Vec<_> = state.incident_edges(member).collect();
    for edge_id in incident {
        let Some(edge) = state.remove_edge(edge_id) else { continue };
        let Some(other) = edge.other(member) else { continue };
        let other = if absorbed.contains(&other) { survivor } else { other };
        if let Some(new_edge) = state.add_edge(survivor, other) {
            ctx.edge_policy.propagate_metadata(state, &[edge_id], &[new_edge.id]);
            ctx.epicenter.insert(other);
        }
    }
}
