// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for wiring crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`docs`] - Canned wire documents with fixed ids
//! - [`invariants`] - Normalization invariant checker
//! - [`state`] - Graph state builder

pub mod config;
pub mod docs;
pub mod invariants;
pub mod state;

pub use config::InMemoryConfigStore;
pub use docs::CannedDoc;
pub use invariants::{assert_normalized, violations, Violation};
pub use state::StateBuilder;
