// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory wiring graph: vertices, edges, adjacency and side tables.
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use wire_geom::{point_on_segment, Aabb, Point2};

use crate::ident::{ClusterId, EdgeId, OwnerId, PinId, VertexId};
use crate::ownership::Ownership;
use crate::record::{Edge, Vertex};

/// Connected component of the graph: the vertex and edge id sets reachable
/// from a seed vertex.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Component {
    /// Vertices in the component.
    pub vertices: BTreeSet<VertexId>,
    /// Edges whose endpoints lie in the component.
    pub edges: BTreeSet<EdgeId>,
}

impl Component {
    /// Returns `true` when the component has no edges.
    #[must_use]
    pub fn is_edgeless(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Pure value type holding the complete wiring graph.
///
/// Primitive operations are total and only keep *local* consistency
/// (adjacency tracks the edge map). Global invariants such as "no two
/// vertices at the same point" are restored by the rule pipeline.
///
/// All maps are ordered so iteration, and therefore every rule decision, is
/// deterministic for a given state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphState {
    pub(crate) vertices: BTreeMap<VertexId, Vertex>,
    pub(crate) edges: BTreeMap<EdgeId, Edge>,
    /// Every edge id appears in the sets of exactly its two endpoints.
    pub(crate) adjacency: BTreeMap<VertexId, BTreeSet<EdgeId>>,
    /// Only non-free tags are stored.
    pub(crate) ownership: BTreeMap<VertexId, Ownership>,
    pub(crate) cluster_labels: BTreeMap<ClusterId, String>,
}

impl GraphState {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the vertex record for `id`.
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// Returns the edge record for `id`.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Iterates vertices in ascending id order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Iterates edges in ascending id order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` when the graph holds no vertices and no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    /// Point of `id`, if the vertex exists.
    #[must_use]
    pub fn point(&self, id: VertexId) -> Option<Point2> {
        self.vertices.get(&id).map(|v| v.point)
    }

    /// Both endpoint positions of an edge.
    #[must_use]
    pub fn segment(&self, id: EdgeId) -> Option<(Point2, Point2)> {
        let edge = self.edges.get(&id)?;
        Some((self.point(edge.start)?, self.point(edge.end)?))
    }

    /// Creates a vertex with a fresh id at `point`.
    ///
    /// Does not check for an existing vertex at the same location; the merge
    /// rule deduplicates.
    pub fn add_vertex(&mut self, point: Point2, ownership: Ownership) -> Vertex {
        let vertex = Vertex { id: VertexId::new(), point, cluster: None };
        self.insert_vertex(vertex, ownership);
        vertex
    }

    /// Inserts (or replaces) a vertex record with a caller-chosen id.
    pub fn insert_vertex(&mut self, vertex: Vertex, ownership: Ownership) {
        self.vertices.insert(vertex.id, vertex);
        self.adjacency.entry(vertex.id).or_default();
        self.set_ownership(vertex.id, ownership);
    }

    /// Creates an edge between `start` and `end`.
    ///
    /// Returns `None` for a self-loop or when either endpoint is missing.
    /// Parallel edges between the same pair are allowed.
    pub fn add_edge(&mut self, start: VertexId, end: VertexId) -> Option<Edge> {
        if start == end || !self.vertices.contains_key(&start) || !self.vertices.contains_key(&end)
        {
            return None;
        }
        let edge = Edge { id: EdgeId::new(), start, end };
        self.edges.insert(edge.id, edge);
        self.adjacency.entry(start).or_default().insert(edge.id);
        self.adjacency.entry(end).or_default().insert(edge.id);
        Some(edge)
    }

    /// Removes a vertex and its side-table entries.
    ///
    /// Incident edges are *not* removed; callers delete them first. Returns
    /// the removed record.
    pub fn remove_vertex(&mut self, id: VertexId) -> Option<Vertex> {
        let removed = self.vertices.remove(&id)?;
        self.ownership.remove(&id);
        match self.adjacency.get(&id) {
            Some(set) if !set.is_empty() => {}
            _ => {
                self.adjacency.remove(&id);
            }
        }
        Some(removed)
    }

    /// Removes an edge and scrubs it from both endpoints' adjacency.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;
        for end in [edge.start, edge.end] {
            let now_empty = self.adjacency.get_mut(&end).is_some_and(|set| {
                set.remove(&id);
                set.is_empty()
            });
            if now_empty && !self.vertices.contains_key(&end) {
                self.adjacency.remove(&end);
            }
        }
        Some(edge)
    }

    /// Moves a vertex. Returns `false` if it does not exist.
    pub fn set_point(&mut self, id: VertexId, point: Point2) -> bool {
        let Some(v) = self.vertices.get_mut(&id) else { return false };
        v.point = point;
        true
    }

    /// Assigns the cluster id of a vertex.
    pub fn set_cluster(&mut self, id: VertexId, cluster: Option<ClusterId>) -> bool {
        let Some(v) = self.vertices.get_mut(&id) else { return false };
        v.cluster = cluster;
        true
    }

    /// Ownership tag of `id` ([`Ownership::Free`] when untagged or absent).
    #[must_use]
    pub fn ownership(&self, id: VertexId) -> Ownership {
        self.ownership.get(&id).copied().unwrap_or_default()
    }

    /// Sets the ownership tag of an existing vertex.
    pub fn set_ownership(&mut self, id: VertexId, ownership: Ownership) {
        if !self.vertices.contains_key(&id) || ownership.is_free() {
            self.ownership.remove(&id);
        } else {
            self.ownership.insert(id, ownership);
        }
    }

    /// Iterates the non-free ownership tags in vertex id order.
    pub fn owned_vertices(&self) -> impl Iterator<Item = (VertexId, Ownership)> + '_ {
        self.ownership.iter().map(|(id, o)| (*id, *o))
    }

    /// Edges incident to `id`, ascending.
    pub fn incident_edges(&self, id: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.adjacency.get(&id).into_iter().flatten().copied()
    }

    /// Number of incident edges (parallel edges count individually).
    #[must_use]
    pub fn degree(&self, id: VertexId) -> usize {
        self.adjacency.get(&id).map_or(0, BTreeSet::len)
    }

    /// Vertices joined to `id` by at least one edge.
    #[must_use]
    pub fn neighbors(&self, id: VertexId) -> BTreeSet<VertexId> {
        self.incident_edges(id)
            .filter_map(|e| self.edges.get(&e).and_then(|edge| edge.other(id)))
            .collect()
    }

    /// Breadth-first connected component containing `seed`.
    ///
    /// Empty when `seed` does not exist.
    #[must_use]
    pub fn component(&self, seed: VertexId) -> Component {
        let mut out = Component::default();
        if !self.vertices.contains_key(&seed) {
            return out;
        }
        let mut queue = VecDeque::from([seed]);
        out.vertices.insert(seed);
        while let Some(v) = queue.pop_front() {
            for e in self.incident_edges(v) {
                let Some(edge) = self.edges.get(&e) else { continue };
                out.edges.insert(e);
                if let Some(next) = edge.other(v) {
                    if self.vertices.contains_key(&next) && out.vertices.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        out
    }

    /// Every connected component, each reported once, ordered by its lowest
    /// vertex id.
    #[must_use]
    pub fn components(&self) -> Vec<Component> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for id in self.vertices.keys() {
            if seen.contains(id) {
                continue;
            }
            let comp = self.component(*id);
            seen.extend(comp.vertices.iter().copied());
            out.push(comp);
        }
        out
    }

    /// Segment membership test at tolerance `tol` (closed segment).
    #[must_use]
    pub fn is_point_on_segment(p: Point2, a: Point2, b: Point2, tol: f64) -> bool {
        point_on_segment(p, a, b, tol)
    }

    /// Lowest-id vertex within `tol` of `point`.
    #[must_use]
    pub fn vertex_at(&self, point: Point2, tol: f64) -> Option<VertexId> {
        self.vertices.values().find(|v| v.point.approx_eq(point, tol)).map(|v| v.id)
    }

    /// Vertex within `tol` of `point` bound to a pin other than `except`.
    #[must_use]
    pub fn pin_at(
        &self,
        point: Point2,
        tol: f64,
        except: Option<(OwnerId, PinId)>,
    ) -> Option<VertexId> {
        self.ownership
            .iter()
            .filter(|(_, o)| o.pin_binding().is_some_and(|b| Some(b) != except))
            .map(|(id, _)| *id)
            .find(|id| self.point(*id).is_some_and(|p| p.approx_eq(point, tol)))
    }

    /// First pair of pin-bound vertices sharing a point, if any.
    #[must_use]
    pub fn stacked_pins(&self, tol: f64) -> Option<(VertexId, VertexId)> {
        let pins: Vec<(VertexId, Point2)> = self
            .ownership
            .iter()
            .filter(|(_, o)| o.is_pin())
            .filter_map(|(id, _)| self.point(*id).map(|p| (*id, p)))
            .collect();
        pins.iter().enumerate().find_map(|(i, (a, pa))| {
            pins[i + 1..].iter().find(|(_, pb)| pa.approx_eq(*pb, tol)).map(|(b, _)| (*a, *b))
        })
    }

    /// Vertices whose points fall inside `bounds`.
    pub fn vertices_in(&self, bounds: Aabb) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices.values().filter(move |v| bounds.contains(v.point))
    }

    /// Bounding box of the given vertices, ignoring unknown ids.
    #[must_use]
    pub fn bounds_of<'a, I>(&self, ids: I) -> Option<Aabb>
    where
        I: IntoIterator<Item = &'a VertexId>,
    {
        Aabb::from_points(ids.into_iter().filter_map(|id| self.point(*id)))
    }

    /// Human-readable label of a cluster.
    #[must_use]
    pub fn cluster_label(&self, cluster: ClusterId) -> Option<&str> {
        self.cluster_labels.get(&cluster).map(String::as_str)
    }

    /// Sets or clears (`None` or empty) the label of a cluster.
    pub fn set_cluster_label(&mut self, cluster: ClusterId, label: Option<String>) {
        match label {
            Some(name) if !name.is_empty() => {
                self.cluster_labels.insert(cluster, name);
            }
            _ => {
                self.cluster_labels.remove(&cluster);
            }
        }
    }

    /// All cluster labels.
    #[must_use]
    pub fn cluster_labels(&self) -> &BTreeMap<ClusterId, String> {
        &self.cluster_labels
    }

    /// Drops labels of clusters no vertex carries any more. Returns how many
    /// were dropped.
    pub fn prune_cluster_labels(&mut self) -> usize {
        let live: BTreeSet<ClusterId> = self.vertices.values().filter_map(|v| v.cluster).collect();
        let before = self.cluster_labels.len();
        self.cluster_labels.retain(|c, _| live.contains(c));
        before - self.cluster_labels.len()
    }

    /// Any vertex currently carrying `cluster`, lowest id first.
    #[must_use]
    pub fn representative(&self, cluster: ClusterId) -> Option<VertexId> {
        self.vertices.values().find(|v| v.cluster == Some(cluster)).map(|v| v.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn add_edge_rejects_self_loop_and_missing_ends() {
        let mut g = GraphState::new();
        let a = g.add_vertex(p(0.0, 0.0), Ownership::Free).id;
        assert!(g.add_edge(a, a).is_none());
        assert!(g.add_edge(a, VertexId::new()).is_none());
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn adjacency_tracks_edges() {
        let mut g = GraphState::new();
        let a = g.add_vertex(p(0.0, 0.0), Ownership::Free).id;
        let b = g.add_vertex(p(10.0, 0.0), Ownership::Free).id;
        let e = g.add_edge(a, b).map(|e| e.id);
        assert_eq!(g.degree(a), 1);
        assert_eq!(g.neighbors(b), BTreeSet::from([a]));
        if let Some(e) = e {
            g.remove_edge(e);
        }
        assert_eq!(g.degree(a), 0);
        assert!(g.neighbors(b).is_empty());
    }

    #[test]
    fn remove_vertex_does_not_cascade() {
        let mut g = GraphState::new();
        let a = g.add_vertex(p(0.0, 0.0), Ownership::Free).id;
        let b = g.add_vertex(p(10.0, 0.0), Ownership::Free).id;
        g.add_edge(a, b);
        g.remove_vertex(a);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.vertex_count(), 1);
    }

    #[test]
    fn component_walks_reachable_set() {
        let mut g = GraphState::new();
        let a = g.add_vertex(p(0.0, 0.0), Ownership::Free).id;
        let b = g.add_vertex(p(10.0, 0.0), Ownership::Free).id;
        let c = g.add_vertex(p(10.0, 10.0), Ownership::Free).id;
        let lone = g.add_vertex(p(50.0, 50.0), Ownership::Free).id;
        g.add_edge(a, b);
        g.add_edge(b, c);
        let comp = g.component(c);
        assert_eq!(comp.vertices, BTreeSet::from([a, b, c]));
        assert_eq!(comp.edges.len(), 2);
        assert!(g.component(lone).is_edgeless());
        assert_eq!(g.components().len(), 2);
    }

    #[test]
    fn free_ownership_is_not_stored() {
        let mut g = GraphState::new();
        let owner = OwnerId::new();
        let pin = PinId::new();
        let a = g.add_vertex(p(0.0, 0.0), Ownership::Pin { owner, pin }).id;
        assert!(g.ownership(a).is_pin());
        g.set_ownership(a, Ownership::Free);
        assert_eq!(g.owned_vertices().count(), 0);
    }

    #[test]
    fn empty_label_clears() {
        let mut g = GraphState::new();
        let net = ClusterId::new();
        g.set_cluster_label(net, Some("VCC".into()));
        assert_eq!(g.cluster_label(net), Some("VCC"));
        g.set_cluster_label(net, Some(String::new()));
        assert_eq!(g.cluster_label(net), None);
    }

    #[test]
    fn pin_queries_ignore_free_vertices_and_own_binding() {
        let mut g = GraphState::new();
        let (owner, pin) = (OwnerId::new(), PinId::new());
        let bound = g.add_vertex(p(0.0, 0.0), Ownership::Pin { owner, pin }).id;
        g.add_vertex(p(10.0, 0.0), Ownership::Free);
        assert_eq!(g.pin_at(p(0.0, 0.0), 1e-6, None), Some(bound));
        assert_eq!(g.pin_at(p(0.0, 0.0), 1e-6, Some((owner, pin))), None);
        assert_eq!(g.pin_at(p(10.0, 0.0), 1e-6, None), None);
        assert_eq!(g.stacked_pins(1e-6), None);

        let other = g.add_vertex(p(0.0, 0.0), Ownership::Pin { owner, pin: PinId::new() }).id;
        assert_eq!(g.stacked_pins(1e-6), Some((bound.min(other), bound.max(other))));
    }
}
