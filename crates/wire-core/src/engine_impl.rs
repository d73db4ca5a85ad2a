// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Resolution engine: transactions in, normalized state and deltas out.
use core::fmt;
use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, instrument, trace};
use wire_geom::GeometryPolicy;

use crate::delta::{diff_states, GraphDelta};
use crate::graph::GraphState;
use crate::ident::VertexId;
use crate::policy::{EdgePolicy, NoEdgeMetadata, PinVertexPolicy, VertexPolicy};
use crate::rule::{ResolutionContext, Ruleset};
use crate::tx::{Transaction, TransactionContext, TxResult};

/// Default margin around the epicenter bounds.
pub const DEFAULT_NEIGHBORHOOD_MARGIN: f64 = 2.0;

/// Errors emitted while configuring the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A rule with this name is already part of the ruleset.
    #[error("rule already registered: {0}")]
    DuplicateRuleName(&'static str),
}

/// Observer invoked synchronously after every committed change.
///
/// The callback must not call back into the engine.
pub type ChangeCallback = Box<dyn FnMut(&GraphDelta, &GraphState)>;

/// Owns the wiring graph and keeps it normalized.
///
/// Every mutation goes through [`ResolutionEngine::execute`] (normalized) or
/// [`ResolutionEngine::replace_state`] (raw, for live drags). Both publish a
/// [`GraphDelta`] through the `on_change` callback before returning.
pub struct ResolutionEngine {
    state: GraphState,
    geometry: Box<dyn GeometryPolicy>,
    ruleset: Ruleset,
    vertex_policy: Box<dyn VertexPolicy>,
    edge_policy: Box<dyn EdgePolicy>,
    neighborhood_margin: f64,
    on_change: Option<ChangeCallback>,
    last_delta: GraphDelta,
    revision: u64,
}

impl fmt::Debug for ResolutionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionEngine")
            .field("vertices", &self.state.vertex_count())
            .field("edges", &self.state.edge_count())
            .field("geometry", &self.geometry)
            .field("rules", &self.ruleset.names().collect::<Vec<_>>())
            .field("neighborhood_margin", &self.neighborhood_margin)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl ResolutionEngine {
    /// Creates an engine over an empty graph with the orthogonal ruleset,
    /// pin protection and no edge metadata.
    pub fn new(geometry: Box<dyn GeometryPolicy>) -> Self {
        Self {
            state: GraphState::new(),
            geometry,
            ruleset: Ruleset::orthogonal(),
            vertex_policy: Box::new(PinVertexPolicy),
            edge_policy: Box::new(NoEdgeMetadata),
            neighborhood_margin: DEFAULT_NEIGHBORHOOD_MARGIN,
            on_change: None,
            last_delta: GraphDelta::default(),
            revision: 0,
        }
    }

    /// Replaces the ruleset.
    pub fn with_ruleset(mut self, ruleset: Ruleset) -> Self {
        self.ruleset = ruleset;
        self
    }

    /// Replaces the vertex policy.
    pub fn with_vertex_policy(mut self, policy: Box<dyn VertexPolicy>) -> Self {
        self.vertex_policy = policy;
        self
    }

    /// Replaces the edge policy.
    pub fn with_edge_policy(mut self, policy: Box<dyn EdgePolicy>) -> Self {
        self.edge_policy = policy;
        self
    }

    /// Sets the rescan margin around the epicenter bounds.
    pub fn with_neighborhood_margin(mut self, margin: f64) -> Self {
        self.neighborhood_margin = margin.max(0.0);
        self
    }

    /// Installs the change observer, replacing any previous one.
    pub fn set_on_change(&mut self, callback: ChangeCallback) {
        self.on_change = Some(callback);
    }

    /// Removes the change observer.
    pub fn clear_on_change(&mut self) {
        self.on_change = None;
    }

    /// Current committed state.
    pub fn state(&self) -> &GraphState {
        &self.state
    }

    /// Active geometry policy.
    pub fn geometry(&self) -> &dyn GeometryPolicy {
        self.geometry.as_ref()
    }

    /// Active vertex policy.
    pub fn vertex_policy(&self) -> &dyn VertexPolicy {
        self.vertex_policy.as_ref()
    }

    /// Delta published by the most recent commit.
    pub fn last_delta(&self) -> &GraphDelta {
        &self.last_delta
    }

    /// Number of commits so far; every commit publishes exactly one delta.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Applies `tx` to a working copy, re-normalizes around its epicenter,
    /// commits and publishes the delta.
    #[instrument(level = "debug", skip_all, fields(tx = tx.name()))]
    pub fn execute<T: Transaction>(&mut self, tx: &mut T) -> T::Output {
        let mut working = self.state.clone();
        let ctx = TransactionContext {
            geometry: self.geometry.as_ref(),
            vertex_policy: self.vertex_policy.as_ref(),
        };
        let TxResult { output, epicenter } = tx.apply(&mut working, &ctx);
        self.resolve(&mut working, epicenter);
        self.commit(working);
        output
    }

    /// Installs `state` as-is, without running any rule.
    ///
    /// Used for live drag updates; the caller re-normalizes later through a
    /// transaction.
    pub fn replace_state(&mut self, state: GraphState) {
        self.commit(state);
    }

    fn resolve(&mut self, working: &mut GraphState, epicenter: BTreeSet<VertexId>) {
        if epicenter.is_empty() {
            trace!("empty epicenter; rules skipped");
            return;
        }
        let margin = self.neighborhood_margin + self.geometry.epsilon();
        let Some(bounds) = working.bounds_of(&epicenter) else {
            return;
        };
        let mut ctx = ResolutionContext {
            epicenter,
            neighborhood: bounds.inflate(margin),
            geometry: self.geometry.as_ref(),
            vertex_policy: self.vertex_policy.as_ref(),
            edge_policy: self.edge_policy.as_mut(),
        };
        for rule in self.ruleset.iter() {
            if let Some(grown) = working.bounds_of(&ctx.epicenter) {
                ctx.neighborhood = ctx.neighborhood.union(&grown.inflate(margin));
            }
            rule.apply(working, &mut ctx);
            debug!(
                rule = rule.name(),
                epicenter = ctx.epicenter.len(),
                vertices = working.vertex_count(),
                edges = working.edge_count(),
                "rule applied"
            );
        }
    }

    fn commit(&mut self, next: GraphState) {
        let delta = diff_states(&self.state, &next);
        self.state = next;
        if !delta.deleted_edges.is_empty() || !delta.created_edges.is_empty() {
            self.edge_policy.edges_removed(&self.state, &delta.deleted_edges);
        }
        if let Some(callback) = self.on_change.as_mut() {
            callback(&delta, &self.state);
        }
        self.last_delta = delta;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transactions::{Connect, LoadState};
    use std::cell::RefCell;
    use std::rc::Rc;
    use wire_geom::{ManhattanGrid, Point2, RoutePreference};

    #[test]
    fn execute_publishes_delta() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut engine = ResolutionEngine::new(Box::new(ManhattanGrid::default()));
        engine.set_on_change(Box::new(move |delta: &GraphDelta, state: &GraphState| {
            sink.borrow_mut().push((delta.created_edges.len(), state.edge_count()));
        }));
        engine.execute(&mut Connect::points(
            Point2::ZERO,
            Point2::new(10.0, 0.0),
            RoutePreference::HorizontalFirst,
        ));
        assert_eq!(seen.borrow().as_slice(), &[(1, 1)]);
    }

    #[test]
    fn renormalizing_a_normalized_state_is_silent() {
        let mut engine = ResolutionEngine::new(Box::new(ManhattanGrid::default()));
        engine.execute(&mut Connect::points(
            Point2::ZERO,
            Point2::new(10.0, 10.0),
            RoutePreference::VerticalFirst,
        ));
        let snapshot = engine.state().clone();
        engine.execute(&mut LoadState::full(snapshot));
        assert!(engine.last_delta().is_empty());
    }
}
