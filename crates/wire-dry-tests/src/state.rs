// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graph state builder for tests.

use wire_core::geom::Point2;
use wire_core::{EdgeId, GraphState, OwnerId, Ownership, PinId, VertexId, WireEngine};

/// Builds raw graph states: vertices land exactly where asked, no rule runs.
///
/// # Example
///
/// ```
/// use wire_dry_tests::StateBuilder;
///
/// let mut b = StateBuilder::new();
/// let run = b.path(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
/// let engine = b.into_engine();
/// assert_eq!(run.len(), 3);
/// assert_eq!(engine.state().edge_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StateBuilder {
    state: GraphState,
}

impl StateBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a free vertex.
    pub fn vertex(&mut self, x: f64, y: f64) -> VertexId {
        self.state.add_vertex(Point2::new(x, y), Ownership::Free).id
    }

    /// Add a vertex bound to `(owner, pin)`.
    pub fn pin(&mut self, owner: OwnerId, pin: PinId, x: f64, y: f64) -> VertexId {
        self.state.add_vertex(Point2::new(x, y), Ownership::Pin { owner, pin }).id
    }

    /// Connect two existing vertices. Returns `None` for self-loops and
    /// missing endpoints.
    pub fn edge(&mut self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.state.add_edge(a, b).map(|e| e.id)
    }

    /// Add a chain of free vertices joined by edges.
    pub fn path(&mut self, points: &[(f64, f64)]) -> Vec<VertexId> {
        let ids: Vec<VertexId> = points.iter().map(|(x, y)| self.vertex(*x, *y)).collect();
        for pair in ids.windows(2) {
            self.edge(pair[0], pair[1]);
        }
        ids
    }

    /// Borrow the state built so far.
    pub fn state(&self) -> &GraphState {
        &self.state
    }

    /// Finish and return the raw state.
    pub fn build(self) -> GraphState {
        self.state
    }

    /// Load the state into a default [`WireEngine`] and normalize all of it.
    pub fn into_engine(self) -> WireEngine {
        let mut engine = WireEngine::new();
        engine.execute(&mut wire_core::transactions::LoadState::full(self.state));
        engine
    }
}
