// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};
use wire_geom::{Point2, Vec2};

use crate::graph::GraphState;
use crate::ident::{EdgeId, VertexId};
use crate::rule::{ResolutionContext, Rule};

/// Replaces runs of collinear edges by the minimal set of edges between the
/// vertices that must survive.
///
/// Works in any direction, not only horizontal and vertical. A vertex of a
/// run is kept when it is a run extreme, protected by the vertex policy, a
/// branch or corner (more incident edges than run edges), or a metadata seam
/// reported by the edge policy. Runs without a removable vertex are left
/// untouched, so parallel duplicate edges survive.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollapseLinearRuns;

const SIGN_TOLERANCE: f64 = 1e-12;

/// One maximal collinear run through a seed.
#[derive(Debug)]
struct Run {
    origin: Point2,
    dir: Vec2,
    edges: BTreeSet<EdgeId>,
    vertices: BTreeSet<VertexId>,
}

impl Run {
    fn param(&self, p: Point2) -> f64 {
        self.dir.dot(p.sub(self.origin))
    }
}

/// Unit line directions of the edges at `v`, sign-normalized and deduplicated.
fn directions_at(state: &GraphState, v: VertexId) -> Vec<Vec2> {
    let Some(origin) = state.point(v) else { return Vec::new() };
    let mut out: Vec<Vec2> = Vec::new();
    for e in state.incident_edges(v) {
        let Some(other) = state.edge(e).and_then(|edge| edge.other(v)) else { continue };
        let Some(p) = state.point(other) else { continue };
        let Some(mut d) = p.sub(origin).normalized() else { continue };
        if d.dx < -SIGN_TOLERANCE || (d.dx.abs() <= SIGN_TOLERANCE && d.dy < 0.0) {
            d = Vec2::new(-d.dx, -d.dy);
        }
        if !out.iter().any(|known| known.cross(d).abs() <= SIGN_TOLERANCE.sqrt()) {
            out.push(d);
        }
    }
    out
}

/// Depth-first walk over edges parallel to `dir`, starting at `seed`.
fn collect_run(state: &GraphState, seed: VertexId, dir: Vec2, eps: f64) -> Option<Run> {
    let origin = state.point(seed)?;
    let mut run = Run { origin, dir, edges: BTreeSet::new(), vertices: BTreeSet::from([seed]) };
    let mut stack = vec![seed];
    while let Some(v) = stack.pop() {
        let Some(vp) = state.point(v) else { continue };
        for e in state.incident_edges(v) {
            let Some(other) = state.edge(e).and_then(|edge| edge.other(v)) else { continue };
            let Some(op) = state.point(other) else { continue };
            let step = op.sub(vp);
            if step.length() <= eps || dir.cross(step).abs() > eps {
                continue;
            }
            run.edges.insert(e);
            if run.vertices.insert(other) {
                stack.push(other);
            }
        }
    }
    (!run.edges.is_empty()).then_some(run)
}

fn run_incident(state: &GraphState, run: &Run, v: VertexId) -> Vec<EdgeId> {
    state.incident_edges(v).filter(|e| run.edges.contains(e)).collect()
}

/// A vertex may only disappear if exactly two run edges meet it, one on each
/// side, and nothing else is attached.
fn is_pass_through(
    state: &GraphState,
    run: &Run,
    v: VertexId,
    params: &BTreeMap<VertexId, f64>,
) -> bool {
    let incident = run_incident(state, run, v);
    if incident.len() != 2 || state.degree(v) != 2 {
        return false;
    }
    let Some(&tv) = params.get(&v) else { return false };
    let sides: Vec<f64> = incident
        .iter()
        .filter_map(|e| state.edge(*e).and_then(|edge| edge.other(v)))
        .filter_map(|o| params.get(&o).copied())
        .map(|t| t - tv)
        .collect();
    sides.len() == 2 && sides[0] * sides[1] < 0.0
}

fn collapse_run(state: &mut GraphState, ctx: &mut ResolutionContext<'_>, run: &Run) -> usize {
    let eps = ctx.epsilon();
    let params: BTreeMap<VertexId, f64> = run
        .vertices
        .iter()
        .filter_map(|v| state.point(*v).map(|p| (*v, run.param(p))))
        .collect();
    let mut order: Vec<(f64, VertexId)> = params.iter().map(|(v, t)| (*t, *v)).collect();
    order.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    let last = order.len().saturating_sub(1);

    let kept: Vec<bool> = order
        .iter()
        .enumerate()
        .map(|(i, (_, v))| {
            i == 0
                || i == last
                || !is_pass_through(state, run, *v, &params)
                || ctx.vertex_policy.is_protected(state, *v)
                || ctx.edge_policy.should_preserve_vertex(state, *v, &run_incident(state, run, *v))
        })
        .collect();
    if kept.iter().all(|k| *k) {
        return 0;
    }

    let kept_idx: Vec<usize> = (0..order.len()).filter(|i| kept[*i]).collect();
    let mut removed = 0usize;
    for pair in kept_idx.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if hi == lo + 1 {
            continue;
        }
        let (t_lo, lo_id) = order[lo];
        let (t_hi, hi_id) = order[hi];
        let span = |e: &EdgeId| -> Option<(f64, f64)> {
            let edge = state.edge(*e)?;
            let (a, b) = (*params.get(&edge.start)?, *params.get(&edge.end)?);
            Some((a.min(b), a.max(b)))
        };
        let mut contained = Vec::new();
        let mut overlapping = Vec::new();
        for e in &run.edges {
            let Some((a, b)) = span(e) else { continue };
            if a >= t_lo - eps && b <= t_hi + eps {
                contained.push(*e);
            } else if a < t_hi - eps && b > t_lo + eps {
                overlapping.push(*e);
            }
        }
        let sources = if contained.is_empty() { overlapping } else { contained.clone() };
        for e in &contained {
            state.remove_edge(*e);
        }
        let Some(new_edge) = state.add_edge(lo_id, hi_id) else { continue };
        if !sources.is_empty() {
            ctx.edge_policy.propagate_metadata(state, &sources, &[new_edge.id]);
        }
        for (_, mid) in &order[lo + 1..hi] {
            if state.degree(*mid) == 0 {
                state.remove_vertex(*mid);
                ctx.epicenter.remove(mid);
                removed += 1;
            } else {
                trace!(vertex = %mid, "collinear vertex still referenced; kept");
            }
        }
        ctx.epicenter.insert(lo_id);
        ctx.epicenter.insert(hi_id);
    }
    removed
}

impl Rule for CollapseLinearRuns {
    fn name(&self) -> &'static str {
        "collapse_linear_runs"
    }

    fn apply(&self, state: &mut GraphState, ctx: &mut ResolutionContext<'_>) {
        let eps = ctx.epsilon();
        let region = ctx.neighborhood.inflate(eps);
        let mut seeds = BTreeSet::new();
        for v in ctx.live_epicenter(state) {
            seeds.insert(v);
            for n in state.neighbors(v) {
                if state.point(n).is_some_and(|p| region.contains(p)) {
                    seeds.insert(n);
                }
            }
        }

        let mut visited: BTreeSet<EdgeId> = BTreeSet::new();
        let mut removed = 0usize;
        for seed in seeds {
            for dir in directions_at(state, seed) {
                let Some(run) = collect_run(state, seed, dir, eps) else { continue };
                if run.edges.is_subset(&visited) {
                    continue;
                }
                visited.extend(run.edges.iter().copied());
                removed += collapse_run(state, ctx, &run);
            }
        }
        if removed > 0 {
            debug!(removed, "collapsed collinear vertices");
        }
    }
}
