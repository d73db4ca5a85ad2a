// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! wire-core: orthogonal connectivity graph engine for schematic wiring.
//!
//! Wires live in a planar graph of vertices and edges. Every edit is a
//! [`Transaction`]; after it runs, the [`ResolutionEngine`] re-normalizes the
//! touched neighbourhood (merge coincident points, split edges at passing
//! vertices, collapse collinear runs, assign net ids) and publishes a
//! [`GraphDelta`]. [`DragController`] moves selections live without running
//! rules and commits once at the end. [`WireEngine`] bundles all of it with
//! net bookkeeping and the persisted [`Wire`] format.
#![forbid(unsafe_code)]

mod config;
mod delta;
mod drag;
mod engine_impl;
mod graph;
mod ident;
mod mirror;
mod ownership;
mod policy;
mod record;
mod rule;
/// Built-in normalization rules.
pub mod rules;
/// Built-in transactions.
pub mod transactions;
mod tx;
mod wire;
mod wire_engine;

pub use config::EngineConfig;
pub use delta::{diff_states, Change, GraphDelta};
pub use drag::{DragController, DragSelection};
pub use engine_impl::{ChangeCallback, EngineError, ResolutionEngine, DEFAULT_NEIGHBORHOOD_MARGIN};
pub use graph::{Component, GraphState};
pub use ident::{ClusterId, EdgeId, OwnerId, PinId, VertexId};
pub use mirror::NetMirror;
pub use ownership::Ownership;
pub use policy::{
    DefaultVertexPolicy, EdgeAttributes, EdgePolicy, NoEdgeMetadata, PinVertexPolicy, VertexPolicy,
};
pub use record::{Edge, Vertex};
pub use rule::{ResolutionContext, Rule, Ruleset};
pub use transactions::Endpoint;
pub use tx::{Transaction, TransactionContext, TxResult};
pub use wire::{AttachmentPoint, PinLocator, Wire, WireSegment};
pub use wire_engine::{BuildReport, NetSummary, WireEngine};

/// Geometry primitives and policies, re-exported for convenience.
pub use wire_geom as geom;
