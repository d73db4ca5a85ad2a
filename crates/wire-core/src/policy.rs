// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Owner-injected vertex and edge policies.
//!
//! Rules never decide on their own what a pin is or what an edge attribute
//! means. They ask a [`VertexPolicy`] which vertices are protected and which
//! coincident vertex survives a merge, and an [`EdgePolicy`] how per-edge
//! metadata follows edges that are split, rewired or collapsed.
use core::fmt;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::graph::GraphState;
use crate::ident::{EdgeId, VertexId};
use crate::ownership::Ownership;

/// Decides which vertices rules may remove and which one survives a merge.
pub trait VertexPolicy: fmt::Debug {
    /// Protected vertices are never collapsed away or deleted by rules or by
    /// `DeleteItems`.
    fn is_protected(&self, state: &GraphState, vertex: VertexId) -> bool;

    /// Picks the survivor among coincident `candidates` (ascending ids).
    ///
    /// Returning `None` leaves the group unmerged.
    fn prefer_survivor(&self, state: &GraphState, candidates: &[VertexId]) -> Option<VertexId>;
}

/// Nothing is protected; the lowest id survives.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultVertexPolicy;

impl VertexPolicy for DefaultVertexPolicy {
    fn is_protected(&self, _state: &GraphState, _vertex: VertexId) -> bool {
        false
    }

    fn prefer_survivor(&self, _state: &GraphState, candidates: &[VertexId]) -> Option<VertexId> {
        candidates.iter().min().copied()
    }
}

/// Protects bound pins and lets them win merges.
///
/// Survivor preference: bound pin, then detached pin, then lowest id.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinVertexPolicy;

impl PinVertexPolicy {
    fn rank(ownership: Ownership) -> u8 {
        match ownership {
            Ownership::Pin { .. } => 0,
            Ownership::DetachedPin { .. } => 1,
            Ownership::Free => 2,
        }
    }
}

impl VertexPolicy for PinVertexPolicy {
    fn is_protected(&self, state: &GraphState, vertex: VertexId) -> bool {
        state.ownership(vertex).is_pin()
    }

    fn prefer_survivor(&self, state: &GraphState, candidates: &[VertexId]) -> Option<VertexId> {
        candidates.iter().copied().min_by_key(|id| (Self::rank(state.ownership(*id)), *id))
    }
}

/// Carries per-edge metadata across topology rewrites.
pub trait EdgePolicy: fmt::Debug {
    /// Called whenever edges `from` are replaced by edges `to` (split chain,
    /// merge rewire, collapse span). Both slices are non-empty.
    fn propagate_metadata(&mut self, state: &GraphState, from: &[EdgeId], to: &[EdgeId]);

    /// Returns `true` if `vertex` separates collinear edges whose metadata
    /// must not be fused. `incident` are the run edges touching `vertex`.
    fn should_preserve_vertex(
        &self,
        _state: &GraphState,
        _vertex: VertexId,
        _incident: &[EdgeId],
    ) -> bool {
        false
    }

    /// Called after every commit that changed the edge set. `removed` are
    /// the committed edges that are gone; edges created and consumed inside
    /// one resolution never show up there, so anything keyed by edge id
    /// should also be checked against `state`.
    fn edges_removed(&mut self, _state: &GraphState, _removed: &BTreeSet<EdgeId>) {}
}

/// Edge policy for graphs without edge metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEdgeMetadata;

impl EdgePolicy for NoEdgeMetadata {
    fn propagate_metadata(&mut self, _state: &GraphState, _from: &[EdgeId], _to: &[EdgeId]) {}
}

/// Stores one attribute value per edge (layer, width, colour, ...).
///
/// The table lives behind a shared handle: clone the policy before handing
/// it to the engine and keep the clone to read or annotate attributes. The
/// handle is single-threaded, matching the engine.
#[derive(Debug)]
pub struct EdgeAttributes<A> {
    table: Rc<RefCell<BTreeMap<EdgeId, A>>>,
}

impl<A> Clone for EdgeAttributes<A> {
    fn clone(&self) -> Self {
        Self { table: Rc::clone(&self.table) }
    }
}

impl<A> Default for EdgeAttributes<A> {
    fn default() -> Self {
        Self { table: Rc::new(RefCell::new(BTreeMap::new())) }
    }
}

impl<A: Clone + PartialEq> EdgeAttributes<A> {
    /// Creates an empty attribute table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the attribute of an edge.
    pub fn set(&self, edge: EdgeId, value: A) {
        self.table.borrow_mut().insert(edge, value);
    }

    /// Returns the attribute of an edge.
    #[must_use]
    pub fn get(&self, edge: EdgeId) -> Option<A> {
        self.table.borrow().get(&edge).cloned()
    }

    /// Number of annotated edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.borrow().len()
    }

    /// Returns `true` when no edge is annotated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.borrow().is_empty()
    }
}

impl<A: Clone + PartialEq + fmt::Debug> EdgePolicy for EdgeAttributes<A> {
    fn propagate_metadata(&mut self, _state: &GraphState, from: &[EdgeId], to: &[EdgeId]) {
        let mut table = self.table.borrow_mut();
        // First annotated source wins; sources are in ascending id order.
        let Some(value) = from.iter().find_map(|e| table.get(e).cloned()) else {
            return;
        };
        for edge in to {
            table.insert(*edge, value.clone());
        }
    }

    fn should_preserve_vertex(
        &self,
        _state: &GraphState,
        _vertex: VertexId,
        incident: &[EdgeId],
    ) -> bool {
        let table = self.table.borrow();
        let mut values = incident.iter().map(|e| table.get(e));
        let Some(first) = values.next() else {
            return false;
        };
        values.any(|v| v != first)
    }

    fn edges_removed(&mut self, state: &GraphState, _removed: &BTreeSet<EdgeId>) {
        self.table.borrow_mut().retain(|edge, _| state.edge(*edge).is_some());
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;
    use crate::ident::{OwnerId, PinId};
    use wire_geom::Point2;

    #[test]
    fn pin_policy_prefers_bound_pin() {
        let mut g = GraphState::new();
        let a = g.add_vertex(Point2::ZERO, Ownership::Free).id;
        let b = g
            .add_vertex(Point2::ZERO, Ownership::Pin { owner: OwnerId::new(), pin: PinId::new() })
            .id;
        let mut ids = vec![a, b];
        ids.sort();
        assert_eq!(PinVertexPolicy.prefer_survivor(&g, &ids), Some(b));
        assert!(PinVertexPolicy.is_protected(&g, b));
        assert!(!PinVertexPolicy.is_protected(&g, a));
        assert_eq!(DefaultVertexPolicy.prefer_survivor(&g, &ids), Some(ids[0]));
    }

    #[test]
    fn attributes_propagate_and_detect_seams() {
        let attrs: EdgeAttributes<u8> = EdgeAttributes::new();
        let mut policy = attrs.clone();
        let mut g = GraphState::new();
        let a = g.add_vertex(Point2::ZERO, Ownership::Free).id;
        let b = g.add_vertex(Point2::new(10.0, 0.0), Ownership::Free).id;
        let c = g.add_vertex(Point2::new(20.0, 0.0), Ownership::Free).id;
        let mut edge = |s, e| g.add_edge(s, e).expect("endpoints exist").id;
        let (e1, e2, e3) = (edge(a, b), edge(a, b), edge(b, c));
        attrs.set(e1, 3);
        policy.propagate_metadata(&g, &[e1], &[e2]);
        assert_eq!(attrs.get(e2), Some(3));
        attrs.set(e3, 4);
        assert!(policy.should_preserve_vertex(&g, b, &[e2, e3]));
        assert!(!policy.should_preserve_vertex(&g, b, &[e1, e2]));

        g.remove_edge(e1);
        attrs.set(EdgeId::new(), 9);
        policy.edges_removed(&g, &BTreeSet::from([e1]));
        assert_eq!(attrs.get(e1), None);
        assert_eq!(attrs.len(), 2);
    }
}
