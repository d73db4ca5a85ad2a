// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graph deltas: what changed between two committed states.
//!
//! A [`GraphDelta`] is computed by diffing the pre- and post-resolution
//! [`GraphState`] by id, so it is independent of how many intermediate
//! rewrites the rules performed. An edge that a rule created and deleted
//! within the same resolution never shows up.
use std::collections::{BTreeMap, BTreeSet};

use wire_geom::Point2;

use crate::graph::GraphState;
use crate::ident::{ClusterId, EdgeId, VertexId};
use crate::ownership::Ownership;

/// Before/after pair.
pub type Change<T> = (T, T);

/// Net effect of one transaction (or one live drag update).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphDelta {
    /// Vertices present after but not before.
    pub created_vertices: BTreeSet<VertexId>,
    /// Vertices present before but not after.
    pub deleted_vertices: BTreeSet<VertexId>,
    /// Edges present after but not before.
    pub created_edges: BTreeSet<EdgeId>,
    /// Edges present before but not after.
    pub deleted_edges: BTreeSet<EdgeId>,
    /// Surviving vertices whose point changed.
    pub moved_vertices: BTreeMap<VertexId, Change<Point2>>,
    /// Cluster id changes, including `None` transitions of created and
    /// deleted vertices that carried an id.
    pub changed_clusters: BTreeMap<VertexId, Change<Option<ClusterId>>>,
    /// Ownership tag changes, including created and deleted non-free vertices.
    pub changed_ownership: BTreeMap<VertexId, Change<Ownership>>,
    /// Cluster label changes.
    pub relabeled_clusters: BTreeMap<ClusterId, Change<Option<String>>>,
}

impl GraphDelta {
    /// Returns `true` when nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created_vertices.is_empty()
            && self.deleted_vertices.is_empty()
            && self.created_edges.is_empty()
            && self.deleted_edges.is_empty()
            && self.moved_vertices.is_empty()
            && self.changed_clusters.is_empty()
            && self.changed_ownership.is_empty()
            && self.relabeled_clusters.is_empty()
    }

    /// Returns `true` if the edge set changed.
    #[must_use]
    pub fn changes_topology(&self) -> bool {
        !self.created_edges.is_empty()
            || !self.deleted_edges.is_empty()
            || !self.created_vertices.is_empty()
            || !self.deleted_vertices.is_empty()
    }

    /// Every cluster id mentioned on either side of a cluster change.
    #[must_use]
    pub fn touched_clusters(&self) -> BTreeSet<ClusterId> {
        self.changed_clusters
            .values()
            .flat_map(|(from, to)| [*from, *to])
            .flatten()
            .collect()
    }
}

/// Diffs two states by id.
#[must_use]
pub fn diff_states(before: &GraphState, after: &GraphState) -> GraphDelta {
    let mut delta = GraphDelta::default();
    diff_vertices(&mut delta, before, after);
    diff_edges(&mut delta, before, after);
    diff_ownership(&mut delta, before, after);
    diff_labels(&mut delta, before, after);
    delta
}

fn diff_vertices(delta: &mut GraphDelta, before: &GraphState, after: &GraphState) {
    for (id, old) in &before.vertices {
        match after.vertices.get(id) {
            None => {
                delta.deleted_vertices.insert(*id);
                if old.cluster.is_some() {
                    delta.changed_clusters.insert(*id, (old.cluster, None));
                }
            }
            Some(new) => {
                if old.point != new.point {
                    delta.moved_vertices.insert(*id, (old.point, new.point));
                }
                if old.cluster != new.cluster {
                    delta.changed_clusters.insert(*id, (old.cluster, new.cluster));
                }
            }
        }
    }
    for (id, new) in &after.vertices {
        if before.vertices.contains_key(id) {
            continue;
        }
        delta.created_vertices.insert(*id);
        if new.cluster.is_some() {
            delta.changed_clusters.insert(*id, (None, new.cluster));
        }
    }
}

fn diff_edges(delta: &mut GraphDelta, before: &GraphState, after: &GraphState) {
    delta.deleted_edges =
        before.edges.keys().filter(|id| !after.edges.contains_key(*id)).copied().collect();
    delta.created_edges =
        after.edges.keys().filter(|id| !before.edges.contains_key(*id)).copied().collect();
}

fn diff_ownership(delta: &mut GraphDelta, before: &GraphState, after: &GraphState) {
    let ids: BTreeSet<VertexId> =
        before.ownership.keys().chain(after.ownership.keys()).copied().collect();
    for id in ids {
        let (old, new) = (before.ownership(id), after.ownership(id));
        if old != new {
            delta.changed_ownership.insert(id, (old, new));
        }
    }
}

fn diff_labels(delta: &mut GraphDelta, before: &GraphState, after: &GraphState) {
    let ids: BTreeSet<ClusterId> =
        before.cluster_labels.keys().chain(after.cluster_labels.keys()).copied().collect();
    for id in ids {
        let old = before.cluster_labels.get(&id).cloned();
        let new = after.cluster_labels.get(&id).cloned();
        if old != new {
            delta.relabeled_clusters.insert(id, (old, new));
        }
    }
}
