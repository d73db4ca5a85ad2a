// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Normalization rule definitions.
use core::fmt;
use std::collections::BTreeSet;

use wire_geom::{Aabb, GeometryPolicy};

use crate::engine_impl::EngineError;
use crate::graph::GraphState;
use crate::ident::VertexId;
use crate::policy::{EdgePolicy, VertexPolicy};
use crate::rules::{
    AssignClusterIds, CollapseLinearRuns, MergeCoincidentVertices, SplitEdgesAtPassingVertices,
};

/// Everything a rule may consult while re-normalizing.
///
/// `epicenter` starts as the vertices touched by the transaction. Rules add
/// the vertices they create or rewire so later rules see them; ids that no
/// longer exist are ignored. `neighborhood` is recomputed by the engine from
/// the epicenter before each rule and only ever grows.
pub struct ResolutionContext<'a> {
    /// Vertices touched so far in this resolution.
    pub epicenter: BTreeSet<VertexId>,
    /// Region rules must rescan.
    pub neighborhood: Aabb,
    /// Snapping and tolerance.
    pub geometry: &'a dyn GeometryPolicy,
    /// Protection and merge-survivor decisions.
    pub vertex_policy: &'a dyn VertexPolicy,
    /// Edge metadata propagation.
    pub edge_policy: &'a mut dyn EdgePolicy,
}

impl ResolutionContext<'_> {
    /// Tolerance shorthand.
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.geometry.epsilon()
    }

    /// Epicenter vertices that still exist in `state`.
    #[must_use]
    pub fn live_epicenter(&self, state: &GraphState) -> Vec<VertexId> {
        self.epicenter.iter().copied().filter(|v| state.vertex(*v).is_some()).collect()
    }
}

impl fmt::Debug for ResolutionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("epicenter", &self.epicenter.len())
            .field("neighborhood", &self.neighborhood)
            .field("geometry", &self.geometry)
            .finish_non_exhaustive()
    }
}

/// A single locality-scoped, idempotent normalization step.
pub trait Rule: fmt::Debug {
    /// Stable name used for logging and duplicate detection.
    fn name(&self) -> &'static str;

    /// Rewrites `state` in place around `ctx.epicenter`.
    fn apply(&self, state: &mut GraphState, ctx: &mut ResolutionContext<'_>);
}

/// Ordered list of rules run after every topology-changing transaction.
#[derive(Debug, Default)]
pub struct Ruleset {
    rules: Vec<Box<dyn Rule>>,
}

impl Ruleset {
    /// Creates an empty ruleset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard pipeline: merge, split, collapse, then cluster assignment.
    #[must_use]
    pub fn orthogonal() -> Self {
        Self {
            rules: vec![
                Box::new(MergeCoincidentVertices),
                Box::new(SplitEdgesAtPassingVertices),
                Box::new(CollapseLinearRuns),
                Box::new(AssignClusterIds),
            ],
        }
    }

    /// Appends a rule, rejecting a name that is already registered.
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<(), EngineError> {
        let name = rule.name();
        if self.rules.iter().any(|r| r.name() == name) {
            return Err(EngineError::DuplicateRuleName(name));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Rule names in execution order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name())
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` when no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &dyn Rule> + '_ {
        self.rules.iter().map(AsRef::as_ref)
    }
}
