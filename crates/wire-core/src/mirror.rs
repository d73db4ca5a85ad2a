// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! External net mirror.
//!
//! Editors keep a second, coarser view of connectivity (net → member
//! vertices) for netlist panels and highlight queries. [`NetMirror`] is that
//! view, kept in step with the graph by replaying [`GraphDelta`]s instead of
//! rescanning the graph after every edit.
use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::delta::GraphDelta;
use crate::graph::GraphState;
use crate::ident::{ClusterId, OwnerId, PinId, VertexId};

/// Net membership index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetMirror {
    members: BTreeMap<ClusterId, BTreeSet<VertexId>>,
    net_of: BTreeMap<VertexId, ClusterId>,
}

impl NetMirror {
    /// Empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror of `state`, built from scratch.
    #[must_use]
    pub fn from_state(state: &GraphState) -> Self {
        let mut mirror = Self::new();
        mirror.rebuild(state);
        mirror
    }

    /// Discards the index and rebuilds it from `state`.
    pub fn rebuild(&mut self, state: &GraphState) {
        self.members.clear();
        self.net_of.clear();
        for v in state.vertices() {
            if let Some(net) = v.cluster {
                self.insert(v.id, net);
            }
        }
    }

    /// Replays one delta. Only cluster changes matter: created and deleted
    /// vertices that carry an id show up there as `None` transitions.
    pub fn apply(&mut self, delta: &GraphDelta) {
        for (v, (from, to)) in &delta.changed_clusters {
            if let Some(old) = from {
                self.remove(*v, *old);
            }
            if let Some(new) = to {
                self.insert(*v, *new);
            }
        }
        for v in &delta.deleted_vertices {
            if let Some(old) = self.net_of.get(v).copied() {
                self.remove(*v, old);
            }
        }
        trace!(nets = self.members.len(), "mirror updated");
    }

    fn insert(&mut self, v: VertexId, net: ClusterId) {
        if let Some(previous) = self.net_of.insert(v, net) {
            if previous != net {
                self.drop_member(v, previous);
            }
        }
        self.members.entry(net).or_default().insert(v);
    }

    fn remove(&mut self, v: VertexId, net: ClusterId) {
        if self.net_of.get(&v) == Some(&net) {
            self.net_of.remove(&v);
        }
        self.drop_member(v, net);
    }

    fn drop_member(&mut self, v: VertexId, net: ClusterId) {
        if let Some(set) = self.members.get_mut(&net) {
            set.remove(&v);
            if set.is_empty() {
                self.members.remove(&net);
            }
        }
    }

    /// Every net with at least one member.
    pub fn nets(&self) -> impl Iterator<Item = ClusterId> + '_ {
        self.members.keys().copied()
    }

    /// Member vertices of `net`.
    pub fn members(&self, net: ClusterId) -> impl Iterator<Item = VertexId> + '_ {
        self.members.get(&net).into_iter().flatten().copied()
    }

    /// Net of `v`, if it has one.
    pub fn net_of(&self, v: VertexId) -> Option<ClusterId> {
        self.net_of.get(&v).copied()
    }

    /// Pins bound to member vertices of `net`, sorted.
    pub fn pins_on_net(&self, state: &GraphState, net: ClusterId) -> Vec<(OwnerId, PinId)> {
        let mut pins: Vec<(OwnerId, PinId)> =
            self.members(net).filter_map(|v| state.ownership(v).pin_binding()).collect();
        pins.sort_unstable();
        pins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::diff_states;
    use crate::ownership::Ownership;
    use wire_geom::Point2;

    #[test]
    fn replaying_deltas_matches_rebuild() {
        let mut before = GraphState::new();
        let a = before.add_vertex(Point2::ZERO, Ownership::Free).id;
        let b = before.add_vertex(Point2::new(4.0, 0.0), Ownership::Free).id;
        let net = ClusterId::new();
        before.set_cluster(a, Some(net));
        before.set_cluster(b, Some(net));
        let mut mirror = NetMirror::from_state(&before);

        let mut after = before.clone();
        after.remove_vertex(a);
        let c = after.add_vertex(Point2::new(8.0, 0.0), Ownership::Free).id;
        let other = ClusterId::new();
        after.set_cluster(b, Some(other));
        after.set_cluster(c, Some(other));

        mirror.apply(&diff_states(&before, &after));
        assert_eq!(mirror, NetMirror::from_state(&after));
        assert_eq!(mirror.nets().collect::<Vec<_>>(), vec![other]);
        assert_eq!(mirror.net_of(a), None);
    }
}
