// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::graph::{Component, GraphState};
use crate::ident::{ClusterId, VertexId};
use crate::rule::{ResolutionContext, Rule};

/// Gives every connected component touched by the resolution one cluster id.
///
/// Edgeless components lose their id. Otherwise an existing id is reused so
/// net identity and labels survive edits: labelled ids first, then the id
/// carried by the most vertices, then the lowest. An id is not reused when
/// another component claimed it earlier in this pass or when vertices outside
/// the touched region still carry it. Larger components claim first, so a
/// split net keeps its id on the bigger half.
///
/// Runs last: cluster identity is a function of the final adjacency.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignClusterIds;

fn seed_components(state: &GraphState, seeds: &[VertexId]) -> Vec<Component> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for seed in seeds {
        if seen.contains(seed) {
            continue;
        }
        let comp = state.component(*seed);
        seen.extend(comp.vertices.iter().copied());
        out.push(comp);
    }
    out.sort_by(|a, b| {
        let size = |c: &Component| c.vertices.len() + c.edges.len();
        size(b).cmp(&size(a)).then_with(|| a.vertices.first().cmp(&b.vertices.first()))
    });
    out
}

fn pick_id(
    state: &GraphState,
    comp: &Component,
    claimed: &BTreeSet<ClusterId>,
    outside: &BTreeMap<ClusterId, usize>,
) -> Option<ClusterId> {
    let mut counts: BTreeMap<ClusterId, usize> = BTreeMap::new();
    for v in &comp.vertices {
        if let Some(c) = state.vertex(*v).and_then(|v| v.cluster) {
            *counts.entry(c).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .filter(|(id, _)| !claimed.contains(id) && outside.get(id).copied().unwrap_or(0) == 0)
        .max_by(|(a_id, a_n), (b_id, b_n)| {
            let a_labelled = state.cluster_label(*a_id).is_some();
            let b_labelled = state.cluster_label(*b_id).is_some();
            a_labelled
                .cmp(&b_labelled)
                .then(a_n.cmp(b_n))
                .then_with(|| b_id.cmp(a_id))
        })
        .map(|(id, _)| id)
}

impl Rule for AssignClusterIds {
    fn name(&self) -> &'static str {
        "assign_cluster_ids"
    }

    fn apply(&self, state: &mut GraphState, ctx: &mut ResolutionContext<'_>) {
        let mut seeds: BTreeSet<VertexId> = BTreeSet::new();
        for v in ctx.live_epicenter(state) {
            seeds.insert(v);
            seeds.extend(state.neighbors(v));
        }
        let seeds: Vec<VertexId> = seeds.into_iter().collect();
        let components = seed_components(state, &seeds);
        let region: BTreeSet<VertexId> =
            components.iter().flat_map(|c| c.vertices.iter().copied()).collect();

        let mut outside: BTreeMap<ClusterId, usize> = BTreeMap::new();
        for v in state.vertices() {
            if let (Some(c), false) = (v.cluster, region.contains(&v.id)) {
                *outside.entry(c).or_default() += 1;
            }
        }

        let mut claimed = BTreeSet::new();
        let mut minted = 0usize;
        for comp in &components {
            let target = if comp.is_edgeless() {
                None
            } else {
                let id = pick_id(state, comp, &claimed, &outside).unwrap_or_else(|| {
                    minted += 1;
                    ClusterId::new()
                });
                claimed.insert(id);
                Some(id)
            };
            for v in &comp.vertices {
                state.set_cluster(*v, target);
            }
            trace!(vertices = comp.vertices.len(), cluster = ?target, "assigned cluster");
        }

        let pruned = state.prune_cluster_labels();
        debug!(components = components.len(), minted, pruned_labels = pruned, "assigned clusters");
    }
}
