// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transaction contract.
//!
//! A transaction is a named mutation intent. It edits a working copy of the
//! graph and reports the vertices it touched (its epicenter); the engine then
//! re-normalizes around that epicenter and publishes the resulting delta.
use std::collections::BTreeSet;

use wire_geom::GeometryPolicy;

use crate::graph::GraphState;
use crate::ident::VertexId;
use crate::policy::VertexPolicy;

/// Read-only policies a transaction may consult.
#[derive(Clone, Copy, Debug)]
pub struct TransactionContext<'a> {
    /// Snapping, tolerance and routing.
    pub geometry: &'a dyn GeometryPolicy,
    /// Which vertices must not be deleted.
    pub vertex_policy: &'a dyn VertexPolicy,
}

/// What a transaction returns to the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct TxResult<O> {
    /// Value handed back to the caller of `execute`.
    pub output: O,
    /// Vertices the rules must re-normalize around. Empty skips the rules.
    pub epicenter: BTreeSet<VertexId>,
}

impl<O> TxResult<O> {
    /// Result with an explicit epicenter.
    pub fn new(output: O, epicenter: BTreeSet<VertexId>) -> Self {
        Self { output, epicenter }
    }

    /// Result that needs no re-normalization.
    pub fn quiet(output: O) -> Self {
        Self { output, epicenter: BTreeSet::new() }
    }
}

/// Atomic, named mutation of a [`GraphState`].
///
/// `apply` must be total: malformed input is a no-op that returns a quiet
/// result.
pub trait Transaction {
    /// Value returned by [`crate::ResolutionEngine::execute`].
    type Output;

    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Mutates `state` and reports the touched vertices.
    fn apply(
        &mut self,
        state: &mut GraphState,
        ctx: &TransactionContext<'_>,
    ) -> TxResult<Self::Output>;
}
