// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Built-in transactions: the editing verbs of the wiring graph.
//!
//! Ids handed back by a transaction are valid right after `apply`; the rules
//! that run afterwards may still merge, split or collapse them. Callers that
//! need a stable handle look it up again (for pins, by binding).
use std::collections::BTreeSet;

use tracing::{debug, warn};
use wire_geom::{Point2, RoutePreference};

use crate::graph::GraphState;
use crate::ident::{ClusterId, EdgeId, OwnerId, PinId, VertexId};
use crate::ownership::Ownership;
use crate::tx::{Transaction, TransactionContext, TxResult};

/// Snaps `point`, then reuses the vertex already there or creates one.
///
/// Returns the vertex and whether it was created.
fn get_or_create_at(
    state: &mut GraphState,
    ctx: &TransactionContext<'_>,
    point: Point2,
) -> (VertexId, bool) {
    let point = ctx.geometry.snap(point);
    match state.vertex_at(point, ctx.geometry.epsilon()) {
        Some(existing) => (existing, false),
        None => (state.add_vertex(point, Ownership::Free).id, true),
    }
}

fn with_neighbors(state: &GraphState, v: VertexId) -> BTreeSet<VertexId> {
    let mut out = state.neighbors(v);
    out.insert(v);
    out
}

/// Returns the vertex at a (snapped) point, creating it if needed.
#[derive(Debug, Clone, Copy)]
pub struct GetOrCreateVertex {
    /// Requested location.
    pub point: Point2,
}

impl Transaction for GetOrCreateVertex {
    type Output = VertexId;

    fn name(&self) -> &'static str {
        "get_or_create_vertex"
    }

    fn apply(
        &mut self,
        state: &mut GraphState,
        ctx: &TransactionContext<'_>,
    ) -> TxResult<VertexId> {
        let (id, created) = get_or_create_at(state, ctx, self.point);
        if created {
            TxResult::new(id, BTreeSet::from([id]))
        } else {
            TxResult::quiet(id)
        }
    }
}

/// Returns the vertex bound to `(owner, pin)`, moving it to `point` if it
/// already exists elsewhere.
///
/// When no vertex is bound yet, a free vertex at the point is adopted. A
/// point holds at most one pin: when a vertex bound to a *different* pin
/// already sits there, nothing changes and the output is `None` (an existing
/// binding stays where it was).
#[derive(Debug, Clone, Copy)]
pub struct GetOrCreatePinVertex {
    /// Component instance owning the pin.
    pub owner: OwnerId,
    /// Pin within the owner.
    pub pin: PinId,
    /// Current pin location.
    pub point: Point2,
}

/// Vertex currently bound to `(owner, pin)`.
#[must_use]
pub fn find_pin_vertex(state: &GraphState, owner: OwnerId, pin: PinId) -> Option<VertexId> {
    state
        .owned_vertices()
        .find(|(_, o)| o.pin_binding() == Some((owner, pin)))
        .map(|(id, _)| id)
}

impl Transaction for GetOrCreatePinVertex {
    type Output = Option<VertexId>;

    fn name(&self) -> &'static str {
        "get_or_create_pin_vertex"
    }

    fn apply(
        &mut self,
        state: &mut GraphState,
        ctx: &TransactionContext<'_>,
    ) -> TxResult<Option<VertexId>> {
        let point = ctx.geometry.snap(self.point);
        let binding = (self.owner, self.pin);
        let existing = find_pin_vertex(state, self.owner, self.pin);
        if let Some(existing) = existing {
            if state.point(existing).is_some_and(|p| ctx.geometry.same_point(p, point)) {
                return TxResult::quiet(Some(existing));
            }
        }
        if let Some(taken) = state.pin_at(point, ctx.geometry.epsilon(), Some(binding)) {
            warn!(
                vertex = %taken,
                owner = %self.owner,
                pin = %self.pin,
                "pin location already bound to another pin; placement refused"
            );
            return TxResult::quiet(None);
        }
        if let Some(existing) = existing {
            let mut epicenter = with_neighbors(state, existing);
            state.set_point(existing, point);
            epicenter.insert(existing);
            return TxResult::new(Some(existing), epicenter);
        }
        let tag = Ownership::Pin { owner: self.owner, pin: self.pin };
        let id = match state.vertex_at(point, ctx.geometry.epsilon()) {
            Some(at) => {
                state.set_ownership(at, tag);
                at
            }
            None => state.add_vertex(point, tag).id,
        };
        TxResult::new(Some(id), BTreeSet::from([id]))
    }
}

/// One side of a [`Connect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    /// A point; the vertex there is reused or created.
    Point(Point2),
    /// An existing vertex.
    Vertex(VertexId),
}

/// Connects two endpoints with a straight edge or a one-corner route.
///
/// Output: the edges created by this transaction, in path order. Empty when
/// an endpoint vertex does not exist or both endpoints resolve to the same
/// vertex.
#[derive(Debug, Clone, Copy)]
pub struct Connect {
    /// Start of the wire.
    pub from: Endpoint,
    /// End of the wire.
    pub to: Endpoint,
    /// Which leg the corner route draws first.
    pub preference: RoutePreference,
}

impl Connect {
    /// Connects two points with the given routing preference.
    #[must_use]
    pub fn points(from: Point2, to: Point2, preference: RoutePreference) -> Self {
        Self { from: Endpoint::Point(from), to: Endpoint::Point(to), preference }
    }
}

impl Transaction for Connect {
    type Output = Vec<EdgeId>;

    fn name(&self) -> &'static str {
        "connect"
    }

    fn apply(
        &mut self,
        state: &mut GraphState,
        ctx: &TransactionContext<'_>,
    ) -> TxResult<Vec<EdgeId>> {
        for end in [self.from, self.to] {
            if let Endpoint::Vertex(id) = end {
                if state.vertex(id).is_none() {
                    debug!(vertex = %id, "connect to missing vertex ignored");
                    return TxResult::quiet(Vec::new());
                }
            }
        }
        let locate = |state: &GraphState, end: Endpoint| match end {
            Endpoint::Vertex(id) => state.point(id),
            Endpoint::Point(p) => Some(ctx.geometry.snap(p)),
        };
        if let (Some(pa), Some(pb)) = (locate(state, self.from), locate(state, self.to)) {
            if ctx.geometry.same_point(pa, pb) {
                debug!("connect endpoints coincide; ignored");
                return TxResult::quiet(Vec::new());
            }
        }
        let mut epicenter = BTreeSet::new();
        let mut resolve = |state: &mut GraphState, end: Endpoint| -> VertexId {
            let id = match end {
                Endpoint::Vertex(id) => id,
                Endpoint::Point(p) => get_or_create_at(state, ctx, p).0,
            };
            epicenter.insert(id);
            id
        };
        let a = resolve(state, self.from);
        let b = resolve(state, self.to);
        if a == b {
            return TxResult::new(Vec::new(), epicenter);
        }
        let (Some(pa), Some(pb)) = (state.point(a), state.point(b)) else {
            return TxResult::quiet(Vec::new());
        };
        let mut path = vec![a];
        for corner in ctx.geometry.route(pa, pb, self.preference) {
            path.push(resolve(state, Endpoint::Point(corner)));
        }
        path.push(b);

        let edges: Vec<EdgeId> = path
            .windows(2)
            .filter_map(|pair| state.add_edge(pair[0], pair[1]).map(|e| e.id))
            .collect();
        TxResult::new(edges, epicenter)
    }
}

/// Deletes vertices (with their edges) and edges.
///
/// Protected vertices are skipped. Free vertices left without edges by the
/// deletion are pruned. Output: number of removed vertices and edges.
#[derive(Debug, Clone, Default)]
pub struct DeleteItems {
    /// Vertices to delete.
    pub vertices: BTreeSet<VertexId>,
    /// Edges to delete.
    pub edges: BTreeSet<EdgeId>,
}

impl Transaction for DeleteItems {
    type Output = usize;

    fn name(&self) -> &'static str {
        "delete_items"
    }

    fn apply(&mut self, state: &mut GraphState, ctx: &TransactionContext<'_>) -> TxResult<usize> {
        let mut touched = BTreeSet::new();
        let mut removed = 0usize;
        for v in &self.vertices {
            if state.vertex(*v).is_none() || ctx.vertex_policy.is_protected(state, *v) {
                continue;
            }
            let incident: Vec<EdgeId> = state.incident_edges(*v).collect();
            for e in incident {
                if let Some(edge) = state.remove_edge(e) {
                    touched.extend([edge.start, edge.end]);
                    removed += 1;
                }
            }
            state.remove_vertex(*v);
            removed += 1;
        }
        for e in &self.edges {
            if let Some(edge) = state.remove_edge(*e) {
                touched.extend([edge.start, edge.end]);
                removed += 1;
            }
        }
        touched.retain(|v| state.vertex(*v).is_some());
        let orphans: Vec<VertexId> = touched
            .iter()
            .copied()
            .filter(|v| state.degree(*v) == 0 && state.ownership(*v).is_free())
            .filter(|v| !ctx.vertex_policy.is_protected(state, *v))
            .collect();
        for v in orphans {
            state.remove_vertex(v);
            touched.remove(&v);
            removed += 1;
        }
        state.prune_cluster_labels();
        TxResult::new(removed, touched)
    }
}

/// Moves one vertex to a (snapped) point.
///
/// Output: `false` if it does not exist, or if it is a pin vertex and the
/// destination already holds a different pin.
#[derive(Debug, Clone, Copy)]
pub struct MoveVertex {
    /// Vertex to move.
    pub vertex: VertexId,
    /// Destination.
    pub to: Point2,
}

impl Transaction for MoveVertex {
    type Output = bool;

    fn name(&self) -> &'static str {
        "move_vertex"
    }

    fn apply(&mut self, state: &mut GraphState, ctx: &TransactionContext<'_>) -> TxResult<bool> {
        if state.vertex(self.vertex).is_none() {
            return TxResult::quiet(false);
        }
        let to = ctx.geometry.snap(self.to);
        if let Some(binding) = state.ownership(self.vertex).pin_binding() {
            if let Some(taken) = state.pin_at(to, ctx.geometry.epsilon(), Some(binding)) {
                warn!(vertex = %self.vertex, %taken, "move onto another pin refused");
                return TxResult::quiet(false);
            }
        }
        let epicenter = with_neighbors(state, self.vertex);
        state.set_point(self.vertex, to);
        TxResult::new(true, epicenter)
    }
}

/// Replaces the whole state and re-normalizes around `epicenter`.
///
/// Used to commit a drag and to load a document.
#[derive(Debug, Clone, Default)]
pub struct LoadState {
    /// State to install.
    pub state: GraphState,
    /// Vertices to re-normalize around.
    pub epicenter: BTreeSet<VertexId>,
}

impl LoadState {
    /// Loads `state` and re-normalizes every vertex.
    #[must_use]
    pub fn full(state: GraphState) -> Self {
        let epicenter = state.vertices().map(|v| v.id).collect();
        Self { state, epicenter }
    }
}

impl Transaction for LoadState {
    type Output = ();

    fn name(&self) -> &'static str {
        "load_state"
    }

    fn apply(&mut self, state: &mut GraphState, _ctx: &TransactionContext<'_>) -> TxResult<()> {
        *state = std::mem::take(&mut self.state);
        let epicenter = std::mem::take(&mut self.epicenter)
            .into_iter()
            .filter(|v| state.vertex(*v).is_some())
            .collect();
        TxResult::new((), epicenter)
    }
}

/// Sets (or clears, with `None`) the label of a cluster.
#[derive(Debug, Clone)]
pub struct SetClusterLabel {
    /// Cluster to label.
    pub cluster: ClusterId,
    /// New label.
    pub label: Option<String>,
}

impl Transaction for SetClusterLabel {
    type Output = ();

    fn name(&self) -> &'static str {
        "set_cluster_label"
    }

    fn apply(&mut self, state: &mut GraphState, _ctx: &TransactionContext<'_>) -> TxResult<()> {
        state.set_cluster_label(self.cluster, self.label.take());
        TxResult::quiet(())
    }
}

/// Releases every pin binding (bound or detached) held by `owner`.
///
/// Released vertices become free; those without edges are removed. Output:
/// number of released bindings.
#[derive(Debug, Clone, Copy)]
pub struct ReleasePins {
    /// Owner whose pins are released.
    pub owner: OwnerId,
}

impl Transaction for ReleasePins {
    type Output = usize;

    fn name(&self) -> &'static str {
        "release_pins"
    }

    fn apply(&mut self, state: &mut GraphState, _ctx: &TransactionContext<'_>) -> TxResult<usize> {
        let released: Vec<VertexId> = state
            .owned_vertices()
            .filter(|(_, o)| o.owner() == Some(self.owner))
            .map(|(id, _)| id)
            .collect();
        let mut epicenter = BTreeSet::new();
        for v in &released {
            state.set_ownership(*v, Ownership::Free);
            if state.degree(*v) == 0 {
                state.remove_vertex(*v);
            } else {
                epicenter.extend(with_neighbors(state, *v));
            }
        }
        state.prune_cluster_labels();
        TxResult::new(released.len(), epicenter)
    }
}
