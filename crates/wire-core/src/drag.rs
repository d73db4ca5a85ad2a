// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Two-phase interactive drag.
//!
//! `update` moves vertices on a cloned state and installs it with
//! [`ResolutionEngine::replace_state`]; no rule runs, so the edge set only
//! changes when a pin is detached. `end` commits through [`LoadState`] so
//! merge, split, collapse and cluster assignment run exactly once.
//!
//! Positions are recomputed from the pre-drag points on every update; only
//! detachments carry over from one update to the next.
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, instrument, trace, warn};
use wire_geom::{Axis, GeometryPolicy, Point2, Vec2};

use crate::engine_impl::ResolutionEngine;
use crate::graph::GraphState;
use crate::ident::{EdgeId, OwnerId, VertexId};
use crate::ownership::Ownership;
use crate::transactions::LoadState;

/// What the user grabbed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragSelection {
    /// Component instances whose pins move rigidly.
    pub components: BTreeSet<OwnerId>,
    /// Wire segments whose non-pin endpoints move.
    pub edges: BTreeSet<EdgeId>,
    /// Free vertices moved directly. They follow the drag vector but do not
    /// pull their neighbors along.
    pub vertices: BTreeSet<VertexId>,
}

impl DragSelection {
    /// Selection of component instances.
    #[must_use]
    pub fn components(ids: impl IntoIterator<Item = OwnerId>) -> Self {
        Self { components: ids.into_iter().collect(), ..Self::default() }
    }

    /// Selection of wire segments.
    #[must_use]
    pub fn edges(ids: impl IntoIterator<Item = EdgeId>) -> Self {
        Self { edges: ids.into_iter().collect(), ..Self::default() }
    }

    /// Selection of free vertices.
    #[must_use]
    pub fn vertices(ids: impl IntoIterator<Item = VertexId>) -> Self {
        Self { vertices: ids.into_iter().collect(), ..Self::default() }
    }
}

/// A pin vertex pulled off its axis during the session.
#[derive(Debug, Clone, Copy)]
struct Detached {
    /// Vertex now carrying the pin binding.
    twin: VertexId,
    /// Vertex whose motion decides the perpendicular coordinate.
    driver: VertexId,
    /// Axis of the original edge between the detached vertex and `driver`.
    axis: Axis,
}

#[derive(Debug)]
struct DragSession {
    /// Committed state at `begin`; source of original points and edge axes.
    origin: GraphState,
    /// `origin` plus spawned twins, with every point still at its original.
    base: GraphState,
    movers: BTreeSet<VertexId>,
    handles: BTreeSet<VertexId>,
    detached: BTreeMap<VertexId, Detached>,
    touched: BTreeSet<VertexId>,
}

impl DragSession {
    fn original(&self, v: VertexId) -> Option<Point2> {
        self.origin.point(v).or_else(|| self.base.point(v))
    }

    fn is_moving(&self, v: VertexId) -> bool {
        self.movers.contains(&v) || self.handles.contains(&v)
    }

    /// Original edges from `v` to vertices outside the moving set, with
    /// their axis.
    fn anchors(&self, v: VertexId, eps: f64) -> Vec<(VertexId, Axis)> {
        let Some(pv) = self.origin.point(v) else { return Vec::new() };
        self.origin
            .incident_edges(v)
            .filter_map(|e| self.origin.edge(e).and_then(|edge| edge.other(v)))
            .filter(|w| !self.is_moving(*w))
            .filter_map(|w| {
                let pw = self.origin.point(w)?;
                Axis::of(pv, pw, eps).map(|axis| (w, axis))
            })
            .collect()
    }

    /// Splits pin vertex `v` from its binding: a twin spawned at the original
    /// point takes the binding and `v` becomes a detached pin.
    ///
    /// A twin whose component is being dragged travels with the drag; a twin
    /// of a pin pulled along by propagation stays put.
    fn detach(&mut self, v: VertexId, driver: VertexId, axis: Axis, twin_moves: bool) {
        let (Some((owner, pin)), Some(point)) =
            (self.base.ownership(v).pin_binding(), self.original(v))
        else {
            return;
        };
        let cluster = self.base.vertex(v).and_then(|r| r.cluster);
        let twin = self.base.add_vertex(point, Ownership::Pin { owner, pin }).id;
        self.base.set_cluster(twin, cluster);
        self.base.set_ownership(v, Ownership::DetachedPin { owner, pin });
        self.base.add_edge(v, twin);
        if twin_moves {
            self.movers.insert(twin);
        }
        self.detached.insert(v, Detached { twin, driver, axis });
        self.touched.extend([v, twin]);
        debug!(vertex = %v, twin = %twin, ?axis, twin_moves, "pin detached");
    }

    fn positions(&mut self, delta: Vec2, eps: f64) -> BTreeMap<VertexId, Point2> {
        // 1. Detach moving pins whose drag leaves the axis of an anchored edge.
        let movers: Vec<VertexId> = self.movers.iter().copied().collect();
        for v in movers {
            if self.detached.contains_key(&v) || !self.base.ownership(v).is_pin() {
                continue;
            }
            let pulled = self
                .anchors(v, eps)
                .into_iter()
                .find(|(_, axis)| delta.component(axis.perpendicular()).abs() > eps);
            if let Some((driver, axis)) = pulled {
                self.detach(v, driver, axis, true);
            }
        }

        // 2. Tentative positions.
        let mut at: BTreeMap<VertexId, Point2> = BTreeMap::new();
        for v in self.movers.iter().chain(&self.handles) {
            if let Some(p) = self.original(*v) {
                at.insert(*v, p.offset(delta));
            }
        }

        // 3. Detached movers become L-bends: the along-axis coordinate comes
        //    from the (moving) twin, the perpendicular one from the driver.
        for v in &self.movers {
            let Some(d) = self.detached.get(v) else { continue };
            let twin_at = at.get(&d.twin).copied().or_else(|| self.base.point(d.twin));
            let driver_at = at.get(&d.driver).copied().or_else(|| self.original(d.driver));
            if let (Some(t), Some(dr)) = (twin_at, driver_at) {
                let perp = d.axis.perpendicular();
                at.insert(*v, t.with_coord(perp, dr.coord(perp)));
            }
        }

        // 4. Propagate axis constraints into stationary anchors.
        let mut queue: VecDeque<VertexId> = self.movers.iter().copied().collect();
        while let Some(u) = queue.pop_front() {
            let Some(pu) = at.get(&u).copied() else { continue };
            for (w, axis) in self.anchors(u, eps) {
                if at.contains_key(&w) {
                    continue;
                }
                let Some(pw) = self.original(w) else { continue };
                let perp = axis.perpendicular();
                let target = pw.with_coord(perp, pu.coord(perp));
                if target.approx_eq(pw, eps) {
                    continue;
                }
                if self.base.ownership(w).is_pin() {
                    self.detach(w, u, axis, false);
                }
                trace!(anchor = %w, from = %pw, to = %target, "anchor follows");
                at.insert(w, target);
                self.touched.insert(w);
                queue.push_back(w);
            }
        }
        at
    }
}

/// Stateful drag session driver.
///
/// Misuse (update, end or cancel without an active session, or begin while
/// one is active) is a no-op returning `false`.
#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a session is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Starts a session. Returns `false` when nothing in `selection` can move.
    #[instrument(level = "debug", skip_all)]
    pub fn begin(&mut self, engine: &ResolutionEngine, selection: &DragSelection) -> bool {
        if self.session.is_some() {
            return false;
        }
        let state = engine.state();
        let mut movers: BTreeSet<VertexId> = state
            .owned_vertices()
            .filter(|(_, o)| o.is_pin())
            .filter(|(_, o)| o.owner().is_some_and(|c| selection.components.contains(&c)))
            .map(|(id, _)| id)
            .collect();
        for edge in selection.edges.iter().filter_map(|e| state.edge(*e)) {
            for end in [edge.start, edge.end] {
                if !state.ownership(end).is_pin() {
                    movers.insert(end);
                }
            }
        }
        let handles: BTreeSet<VertexId> = selection
            .vertices
            .iter()
            .copied()
            .filter(|v| state.vertex(*v).is_some() && !state.ownership(*v).is_pin())
            .filter(|v| !movers.contains(v))
            .collect();
        if movers.is_empty() && handles.is_empty() {
            debug!("nothing movable in selection");
            return false;
        }
        let touched = movers.union(&handles).copied().collect();
        debug!(movers = movers.len(), handles = handles.len(), "drag started");
        self.session = Some(DragSession {
            origin: state.clone(),
            base: state.clone(),
            movers,
            handles,
            detached: BTreeMap::new(),
            touched,
        });
        true
    }

    /// Moves the selection by the total drag vector `delta` (relative to the
    /// pre-drag positions) without running any rule.
    #[instrument(level = "trace", skip_all)]
    pub fn update(&mut self, engine: &mut ResolutionEngine, delta: Vec2) -> bool {
        let Some(session) = self.session.as_mut() else { return false };
        let delta = snap_delta(engine.geometry(), delta);
        let at = session.positions(delta, engine.geometry().epsilon());
        let mut next = session.base.clone();
        for (v, p) in at {
            next.set_point(v, p);
        }
        engine.replace_state(next);
        true
    }

    /// Finishes the session: detached pins become free points and the final
    /// geometry is committed through the rule pipeline.
    ///
    /// A drop that would stack two pins on one point is refused: the
    /// pre-drag state is restored as by [`Self::cancel`] and `false` is
    /// returned.
    #[instrument(level = "debug", skip_all)]
    pub fn end(&mut self, engine: &mut ResolutionEngine) -> bool {
        let Some(session) = self.session.take() else { return false };
        if let Some((a, b)) = engine.state().stacked_pins(engine.geometry().epsilon()) {
            warn!(%a, %b, "drop would stack two pins; drag rolled back");
            engine.replace_state(session.origin);
            return false;
        }
        let mut state = engine.state().clone();
        for v in session.detached.keys() {
            if matches!(state.ownership(*v), Ownership::DetachedPin { .. }) {
                state.set_ownership(*v, Ownership::Free);
            }
        }
        let epicenter: BTreeSet<VertexId> =
            session.touched.into_iter().filter(|v| state.vertex(*v).is_some()).collect();
        debug!(touched = epicenter.len(), detached = session.detached.len(), "drag committed");
        engine.execute(&mut LoadState { state, epicenter });
        true
    }

    /// Abandons the session and restores the pre-drag state.
    #[instrument(level = "debug", skip_all)]
    pub fn cancel(&mut self, engine: &mut ResolutionEngine) -> bool {
        let Some(session) = self.session.take() else { return false };
        engine.replace_state(session.origin);
        true
    }
}

fn snap_delta(geometry: &dyn GeometryPolicy, delta: Vec2) -> Vec2 {
    let p = geometry.snap(Point2::new(delta.dx, delta.dy));
    Vec2::new(p.x, p.y)
}
