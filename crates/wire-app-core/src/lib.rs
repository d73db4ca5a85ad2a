// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for wiring tools (config, prefs).
//! Keeps CLI and editor adapters thin and storage-agnostic.

pub mod config;
pub mod prefs;
