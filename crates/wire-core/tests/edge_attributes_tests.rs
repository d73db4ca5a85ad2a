// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Per-edge metadata through split and collapse.

mod common;

use std::collections::BTreeSet;

use common::{edge_between, p, vertex_at, EPS};
use wire_core::{EdgeAttributes, WireEngine};
use wire_dry_tests::assert_normalized;

fn engine_with(attrs: &EdgeAttributes<&'static str>) -> WireEngine {
    WireEngine::new().with_edge_policy(Box::new(attrs.clone()))
}

#[test]
fn differing_attributes_keep_the_seam_vertex() {
    let attrs = EdgeAttributes::new();
    let mut engine = engine_with(&attrs);
    let first = engine.connect_points(p(0.0, 0.0), p(10.0, 0.0));
    attrs.set(first[0], "power");
    let second = engine.connect_points(p(10.0, 0.0), p(20.0, 0.0));
    assert_eq!(engine.state().vertex_count(), 3);
    assert_eq!(engine.state().edge_count(), 2);

    // Once both sides agree the seam is collinear noise again.
    attrs.set(second[0], "power");
    let seam = vertex_at(engine.state(), 10.0, 0.0).expect("seam vertex");
    let state = engine.state().clone();
    engine.load_state(state, BTreeSet::from([seam]));
    assert_eq!(engine.state().vertex_count(), 2);
    let merged = edge_between(engine.state(), p(0.0, 0.0), p(20.0, 0.0)).expect("fused edge");
    assert_eq!(attrs.get(merged), Some("power"));
    assert_eq!(attrs.len(), 1);
    assert_normalized(engine.state(), EPS);
}

#[test]
fn split_halves_inherit_the_bus_attribute() {
    let attrs = EdgeAttributes::new();
    let mut engine = engine_with(&attrs);
    let bus = engine.connect_points(p(0.0, 0.0), p(20.0, 0.0));
    attrs.set(bus[0], "power");
    engine.connect_points(p(10.0, 0.0), p(10.0, 10.0));

    let state = engine.state();
    let left = edge_between(state, p(0.0, 0.0), p(10.0, 0.0)).expect("left half");
    let right = edge_between(state, p(10.0, 0.0), p(20.0, 0.0)).expect("right half");
    let stub = edge_between(state, p(10.0, 0.0), p(10.0, 10.0)).expect("stub");
    assert_eq!(attrs.get(left), Some("power"));
    assert_eq!(attrs.get(right), Some("power"));
    assert_eq!(attrs.get(stub), None);
    assert_eq!(attrs.get(bus[0]), None);
    assert_eq!(attrs.len(), 2);
}

#[test]
fn deleted_edges_drop_their_attributes() {
    let attrs = EdgeAttributes::new();
    let mut engine = engine_with(&attrs);
    let edge = engine.connect_points(p(0.0, 0.0), p(0.0, 10.0));
    attrs.set(edge[0], "signal");
    engine.delete_items([], edge.iter().copied());
    assert!(attrs.is_empty());
    assert!(engine.state().is_empty());
}

#[test]
fn edges_consumed_within_one_resolution_leave_no_attributes() {
    let attrs = EdgeAttributes::new();
    let mut engine = engine_with(&attrs);
    let bus = engine.connect_points(p(0.0, 0.0), p(20.0, 0.0));
    attrs.set(bus[0], "power");

    // Split at the new point, then collapsed straight back.
    assert_eq!(engine.get_or_create_vertex(p(10.0, 0.0)), None);
    assert_eq!(engine.state().edge_count(), 1);
    let fused = edge_between(engine.state(), p(0.0, 0.0), p(20.0, 0.0)).expect("bus");
    assert_eq!(attrs.get(fused), Some("power"));
    assert_eq!(attrs.len(), 1);
}
