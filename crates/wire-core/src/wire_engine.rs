// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Owning facade: the object an editor holds.
//!
//! [`WireEngine`] wraps a [`ResolutionEngine`] and a [`DragController`],
//! keeps the pin index and the [`NetMirror`] in step with every committed
//! delta, and converts between the graph and the persisted [`Wire`] list.
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, instrument, warn};
use wire_geom::{GeometryPolicy, Point2, RoutePreference, Vec2};

use crate::config::EngineConfig;
use crate::delta::GraphDelta;
use crate::drag::{DragController, DragSelection};
use crate::engine_impl::{ChangeCallback, ResolutionEngine};
use crate::graph::{Component, GraphState};
use crate::ident::{ClusterId, EdgeId, OwnerId, PinId, VertexId};
use crate::mirror::NetMirror;
use crate::ownership::Ownership;
use crate::policy::{EdgePolicy, VertexPolicy};
use crate::transactions::{
    Connect, DeleteItems, Endpoint, GetOrCreatePinVertex, GetOrCreateVertex, LoadState,
    MoveVertex, ReleasePins, SetClusterLabel,
};
use crate::tx::Transaction;
use crate::wire::{AttachmentPoint, PinLocator, Wire, WireSegment};

/// One row of the net list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetSummary {
    /// Net identity.
    pub id: ClusterId,
    /// Label, or a name synthesized from the id.
    pub name: String,
    /// Member vertices.
    pub vertex_count: usize,
    /// Member edges.
    pub edge_count: usize,
}

/// Outcome of [`WireEngine::build`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Segments turned into edges.
    pub loaded: usize,
    /// Segments dropped because an end could not be placed: its pin is
    /// unknown to the locator or sits where another pin already is, or the
    /// segment has no length.
    pub skipped: usize,
}

/// Wiring engine with net and pin bookkeeping.
#[derive(Debug)]
pub struct WireEngine {
    engine: ResolutionEngine,
    drag: DragController,
    mirror: NetMirror,
    pin_index: BTreeMap<(OwnerId, PinId), VertexId>,
    config: EngineConfig,
    synced: u64,
}

impl Default for WireEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WireEngine {
    /// Engine on the default grid.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine on the Manhattan grid described by `config`.
    pub fn with_config(config: EngineConfig) -> Self {
        let geometry = Box::new(config.geometry());
        Self::with_geometry(config, geometry)
    }

    /// Engine with an explicit geometry policy; `config` still supplies the
    /// margin, net prefix and default routing.
    pub fn with_geometry(config: EngineConfig, geometry: Box<dyn GeometryPolicy>) -> Self {
        let engine =
            ResolutionEngine::new(geometry).with_neighborhood_margin(config.neighborhood_margin);
        Self {
            synced: engine.revision(),
            engine,
            drag: DragController::new(),
            mirror: NetMirror::new(),
            pin_index: BTreeMap::new(),
            config,
        }
    }

    /// Replaces the edge policy.
    pub fn with_edge_policy(mut self, policy: Box<dyn EdgePolicy>) -> Self {
        self.engine = self.engine.with_edge_policy(policy);
        self
    }

    /// Replaces the vertex policy.
    pub fn with_vertex_policy(mut self, policy: Box<dyn VertexPolicy>) -> Self {
        self.engine = self.engine.with_vertex_policy(policy);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Committed graph.
    pub fn state(&self) -> &GraphState {
        self.engine.state()
    }

    /// Underlying resolution engine.
    pub fn engine(&self) -> &ResolutionEngine {
        &self.engine
    }

    /// Delta of the most recent commit.
    pub fn last_delta(&self) -> &GraphDelta {
        self.engine.last_delta()
    }

    /// Net membership mirror.
    pub fn mirror(&self) -> &NetMirror {
        &self.mirror
    }

    /// Installs the change observer. It runs before the mirror and pin index
    /// catch up, so it must read the state it is handed.
    pub fn set_on_change(&mut self, callback: ChangeCallback) {
        self.engine.set_on_change(callback);
    }

    /// Runs any transaction and brings the bookkeeping up to date.
    pub fn execute<T: Transaction>(&mut self, tx: &mut T) -> T::Output {
        let out = self.engine.execute(tx);
        self.sync();
        out
    }

    fn sync(&mut self) {
        let revision = self.engine.revision();
        if revision == self.synced {
            return;
        }
        if revision == self.synced + 1 {
            let delta = self.engine.last_delta();
            self.mirror.apply(delta);
            apply_pin_changes(&mut self.pin_index, delta);
        } else {
            debug!(from = self.synced, to = revision, "bookkeeping rebuilt");
            self.mirror.rebuild(self.engine.state());
            self.pin_index = self
                .engine
                .state()
                .owned_vertices()
                .filter_map(|(v, o)| o.pin_binding().map(|b| (b, v)))
                .collect();
        }
        self.synced = revision;
    }

    fn snapped(&self, point: Point2) -> Point2 {
        self.engine.geometry().snap(point)
    }

    /// Vertex at `point` after normalization.
    pub fn get_or_create_vertex(&mut self, point: Point2) -> Option<VertexId> {
        self.execute(&mut GetOrCreateVertex { point });
        let at = self.snapped(point);
        self.state().vertex_at(at, self.engine.geometry().epsilon())
    }

    /// Vertex bound to `(owner, pin)`, created or moved to `point`. `None`
    /// when another pin already sits there.
    pub fn get_or_create_pin_vertex(
        &mut self,
        owner: OwnerId,
        pin: PinId,
        point: Point2,
    ) -> Option<VertexId> {
        self.execute(&mut GetOrCreatePinVertex { owner, pin, point })?;
        self.find_vertex(owner, pin)
    }

    /// Connects two endpoints. `None` uses the configured routing. Returns
    /// the edges that exist afterwards and did not exist before.
    pub fn connect(
        &mut self,
        from: Endpoint,
        to: Endpoint,
        routing: Option<RoutePreference>,
    ) -> Vec<EdgeId> {
        let preference = routing.unwrap_or(self.config.default_routing);
        self.execute(&mut Connect { from, to, preference });
        self.last_delta().created_edges.iter().copied().collect()
    }

    /// Connects two points with the configured routing.
    pub fn connect_points(&mut self, from: Point2, to: Point2) -> Vec<EdgeId> {
        self.connect(Endpoint::Point(from), Endpoint::Point(to), None)
    }

    /// Deletes vertices and edges; protected vertices are skipped.
    pub fn delete_items(
        &mut self,
        vertices: impl IntoIterator<Item = VertexId>,
        edges: impl IntoIterator<Item = EdgeId>,
    ) -> usize {
        self.execute(&mut DeleteItems {
            vertices: vertices.into_iter().collect(),
            edges: edges.into_iter().collect(),
        })
    }

    /// Moves one vertex.
    pub fn move_vertex(&mut self, vertex: VertexId, to: Point2) -> bool {
        self.execute(&mut MoveVertex { vertex, to })
    }

    /// Replaces the graph and re-normalizes around `epicenter`.
    pub fn load_state(&mut self, state: GraphState, epicenter: BTreeSet<VertexId>) {
        self.execute(&mut LoadState { state, epicenter });
    }

    /// Sets or clears a net label.
    pub fn set_net_label(&mut self, net: ClusterId, label: Option<String>) {
        self.execute(&mut SetClusterLabel { cluster: net, label });
    }

    /// Releases every pin of a removed component.
    pub fn release_pins(&mut self, owner: OwnerId) -> usize {
        self.execute(&mut ReleasePins { owner })
    }

    /// Starts a drag session.
    pub fn begin_drag(&mut self, selection: &DragSelection) -> bool {
        self.drag.begin(&self.engine, selection)
    }

    /// Moves the dragged selection by the total drag vector.
    pub fn update_drag(&mut self, delta: Vec2) -> bool {
        let moved = self.drag.update(&mut self.engine, delta);
        self.sync();
        moved
    }

    /// Commits the drag.
    pub fn end_drag(&mut self) -> bool {
        let ended = self.drag.end(&mut self.engine);
        self.sync();
        ended
    }

    /// Abandons the drag and restores the pre-drag graph.
    pub fn cancel_drag(&mut self) -> bool {
        let cancelled = self.drag.cancel(&mut self.engine);
        self.sync();
        cancelled
    }

    /// Returns `true` while a drag session is active.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    /// Vertex bound to `(owner, pin)`.
    pub fn find_vertex(&self, owner: OwnerId, pin: PinId) -> Option<VertexId> {
        self.pin_index.get(&(owner, pin)).copied()
    }

    /// Display name of a net.
    pub fn net_name(&self, net: ClusterId) -> String {
        self.state().cluster_label(net).map_or_else(
            || format!("{}{}", self.config.net_name_prefix, net.short()),
            str::to_owned,
        )
    }

    /// Every net, ordered by id.
    pub fn nets(&self) -> Vec<NetSummary> {
        self.mirror
            .nets()
            .filter_map(|id| {
                let comp = self.component(id)?;
                Some(NetSummary {
                    id,
                    name: self.net_name(id),
                    vertex_count: comp.vertices.len(),
                    edge_count: comp.edges.len(),
                })
            })
            .collect()
    }

    /// Connected component carrying `net`.
    pub fn component(&self, net: ClusterId) -> Option<Component> {
        let seed = self.mirror.members(net).next()?;
        Some(self.state().component(seed))
    }

    /// Pins attached to `net`.
    pub fn pins_on_net(&self, net: ClusterId) -> Vec<(OwnerId, PinId)> {
        self.mirror.pins_on_net(self.state(), net)
    }

    /// Replaces the graph with the one described by `wires`.
    ///
    /// Pin attachments are placed where `pins` says; segments touching a pin
    /// it cannot locate, or that would stack two pins on one point, are
    /// skipped. Net ids and labels are kept unless two
    /// wires turn out to be connected, in which case one id survives.
    #[instrument(level = "debug", skip_all, fields(wires = wires.len()))]
    pub fn build(&mut self, wires: &[Wire], pins: &dyn PinLocator) -> BuildReport {
        let geometry = self.engine.geometry();
        let mut state = GraphState::new();
        let mut report = BuildReport::default();
        for wire in wires {
            let mut members = BTreeSet::new();
            for segment in &wire.segments {
                if let Err(reason) = placeable(&state, geometry, segment, pins) {
                    warn!(net = %wire.net, reason, "segment skipped");
                    report.skipped += 1;
                    continue;
                }
                let a = attach(&mut state, geometry, segment.start, pins);
                let b = attach(&mut state, geometry, segment.end, pins);
                let (Some(a), Some(b)) = (a, b) else { continue };
                state.add_edge(a, b);
                members.extend([a, b]);
                report.loaded += 1;
            }
            for v in members {
                if state.vertex(v).is_some_and(|r| r.cluster.is_none()) {
                    state.set_cluster(v, Some(wire.net));
                }
            }
            if let Some(label) = &wire.label {
                state.set_cluster_label(wire.net, Some(label.clone()));
            }
        }
        self.execute(&mut LoadState::full(state));
        debug!(loaded = report.loaded, skipped = report.skipped, "wires built");
        report
    }

    /// Derives one wire per net, sorted by net id, segments in canonical
    /// order.
    pub fn to_wires(&self) -> Vec<Wire> {
        let state = self.state();
        let mut wires: Vec<Wire> = state
            .components()
            .into_iter()
            .filter(|comp| !comp.is_edgeless())
            .filter_map(|comp| {
                let net =
                    comp.vertices.iter().find_map(|v| state.vertex(*v).and_then(|r| r.cluster))?;
                let mut segments: Vec<WireSegment> = comp
                    .edges
                    .iter()
                    .filter_map(|e| state.edge(*e))
                    .filter_map(|edge| {
                        let start = attachment(state, edge.start)?;
                        let end = attachment(state, edge.end)?;
                        Some(WireSegment::new(start, end).canonical())
                    })
                    .collect();
                segments.sort_by(WireSegment::canonical_cmp);
                Some(Wire {
                    net,
                    label: state.cluster_label(net).map(str::to_owned),
                    segments,
                })
            })
            .collect();
        wires.sort_by_key(|w| w.net);
        wires
    }
}

fn apply_pin_changes(index: &mut BTreeMap<(OwnerId, PinId), VertexId>, delta: &GraphDelta) {
    for (v, (old, _)) in &delta.changed_ownership {
        if let Some(binding) = old.pin_binding() {
            if index.get(&binding) == Some(v) {
                index.remove(&binding);
            }
        }
    }
    for (v, (_, new)) in &delta.changed_ownership {
        if let Some(binding) = new.pin_binding() {
            index.insert(binding, *v);
        }
    }
}

/// Checks that both ends of `segment` can be placed without stacking two
/// pins on one point or collapsing the segment to nothing.
fn placeable(
    state: &GraphState,
    geometry: &dyn GeometryPolicy,
    segment: &WireSegment,
    pins: &dyn PinLocator,
) -> Result<(), &'static str> {
    let eps = geometry.epsilon();
    let mut ends = [Point2::ZERO; 2];
    for (slot, at) in ends.iter_mut().zip([segment.start, segment.end]) {
        let p = geometry.snap(at.resolve(pins).ok_or("pin location unknown")?);
        if let AttachmentPoint::Pin { component, pin } = at {
            let bound =
                state.owned_vertices().any(|(_, o)| o.pin_binding() == Some((component, pin)));
            if !bound && state.pin_at(p, eps, Some((component, pin))).is_some() {
                return Err("pin location held by another pin");
            }
        }
        *slot = p;
    }
    if geometry.same_point(ends[0], ends[1]) {
        return Err("zero-length segment");
    }
    Ok(())
}

/// Vertex for one end of a persisted segment, created on demand.
fn attach(
    state: &mut GraphState,
    geometry: &dyn GeometryPolicy,
    at: AttachmentPoint,
    pins: &dyn PinLocator,
) -> Option<VertexId> {
    let eps = geometry.epsilon();
    match at {
        AttachmentPoint::Free { at } => {
            let p = geometry.snap(at);
            Some(state.vertex_at(p, eps).unwrap_or_else(|| state.add_vertex(p, Ownership::Free).id))
        }
        AttachmentPoint::Pin { component, pin } => {
            let tag = Ownership::Pin { owner: component, pin };
            let bound = state
                .owned_vertices()
                .find(|(_, o)| o.pin_binding() == Some((component, pin)))
                .map(|(v, _)| v);
            if bound.is_some() {
                return bound;
            }
            let p = geometry.snap(pins.locate(component, pin)?);
            match state.vertex_at(p, eps) {
                Some(v) if state.ownership(v).is_free() => {
                    state.set_ownership(v, tag);
                    Some(v)
                }
                _ => Some(state.add_vertex(p, tag).id),
            }
        }
    }
}

fn attachment(state: &GraphState, v: VertexId) -> Option<AttachmentPoint> {
    match state.ownership(v).pin_binding() {
        Some((component, pin)) => Some(AttachmentPoint::pin(component, pin)),
        None => state.point(v).map(AttachmentPoint::free),
    }
}
