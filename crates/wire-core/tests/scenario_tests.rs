// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! End-to-end editing scenarios on the default Manhattan engine.

mod common;

use common::{p, sorted_points, vertex_at, EPS};
use wire_core::geom::{FreeGeometry, ManhattanGrid, Vec2};
use wire_core::rules::{CollapseLinearRuns, SplitEdgesAtPassingVertices};
use wire_core::transactions::LoadState;
use wire_core::{
    DragSelection, EngineConfig, EngineError, OwnerId, PinId, ResolutionEngine, Ruleset,
    WireEngine,
};
use wire_dry_tests::{assert_normalized, violations, StateBuilder};

#[test]
fn l_shape_live_drag_then_commit() {
    let mut engine = WireEngine::new();
    engine.connect_points(p(0.0, 0.0), p(100.0, 0.0));
    engine.connect_points(p(100.0, 0.0), p(100.0, 100.0));
    assert_eq!(engine.state().vertex_count(), 3);
    assert_eq!(engine.state().edge_count(), 2);
    let nets = engine.nets();
    assert_eq!(nets.len(), 1);
    assert_eq!(nets[0].edge_count, 2);

    let corner = vertex_at(engine.state(), 100.0, 0.0).expect("corner vertex");
    let edges_before: Vec<_> = engine.state().edges().map(|e| e.id).collect();
    assert!(engine.begin_drag(&DragSelection::vertices([corner])));
    assert!(engine.update_drag(Vec2::new(0.0, 50.0)));
    assert_eq!(
        sorted_points(engine.state()),
        vec![p(0.0, 0.0), p(100.0, 50.0), p(100.0, 100.0)]
    );
    let edges_live: Vec<_> = engine.state().edges().map(|e| e.id).collect();
    assert_eq!(edges_before, edges_live);

    assert!(engine.end_drag());
    assert_eq!(
        sorted_points(engine.state()),
        vec![p(0.0, 0.0), p(100.0, 50.0), p(100.0, 100.0)]
    );
    assert_eq!(engine.state().edge_count(), 2);
    assert_eq!(engine.nets().len(), 1);
    assert_normalized(engine.state(), EPS);
}

#[test]
fn connecting_twice_keeps_parallel_edges() {
    let mut engine = WireEngine::new();
    let first = engine.connect_points(p(0.0, 0.0), p(10.0, 0.0));
    let second = engine.connect_points(p(0.0, 0.0), p(10.0, 0.0));
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_ne!(first, second);
    assert_eq!(engine.state().vertex_count(), 2);
    assert_eq!(engine.state().edge_count(), 2);
    assert_eq!(engine.nets()[0].edge_count, 2);
}

#[test]
fn collinear_run_collapses_to_one_edge() {
    let mut engine = WireEngine::new();
    engine.connect_points(p(0.0, 0.0), p(10.0, 0.0));
    engine.connect_points(p(10.0, 0.0), p(20.0, 0.0));
    assert_eq!(sorted_points(engine.state()), vec![p(0.0, 0.0), p(20.0, 0.0)]);
    assert_eq!(engine.state().edge_count(), 1);
    assert_normalized(engine.state(), EPS);
}

#[test]
fn pin_in_the_middle_of_a_run_is_preserved() {
    let mut engine = WireEngine::new();
    let (owner, pin) = (OwnerId::new(), PinId::new());
    let b = engine.get_or_create_pin_vertex(owner, pin, p(10.0, 0.0)).expect("pin vertex");
    engine.connect_points(p(0.0, 0.0), p(10.0, 0.0));
    engine.connect_points(p(10.0, 0.0), p(20.0, 0.0));
    assert_eq!(engine.state().vertex_count(), 3);
    assert_eq!(engine.state().edge_count(), 2);
    assert_eq!(engine.find_vertex(owner, pin), Some(b));
    assert_eq!(engine.state().degree(b), 2);
}

#[test]
fn crossing_vertex_splits_edge() {
    let mut engine = WireEngine::new();
    engine.connect_points(p(0.0, 0.0), p(20.0, 0.0));
    engine.connect_points(p(10.0, 0.0), p(10.0, 10.0));
    assert_eq!(engine.state().vertex_count(), 4);
    assert_eq!(engine.state().edge_count(), 3);
    let t = vertex_at(engine.state(), 10.0, 0.0).expect("junction");
    assert_eq!(engine.state().degree(t), 3);
    assert_normalized(engine.state(), EPS);
}

#[test]
fn moving_onto_another_vertex_merges() {
    let mut b = StateBuilder::new();
    b.path(&[(0.0, 0.0), (0.0, 10.0)]);
    let right = b.path(&[(20.0, 0.0), (20.0, 10.0)]);
    let mut engine = b.into_engine();
    assert_eq!(engine.nets().len(), 2);
    assert!(engine.move_vertex(right[1], p(0.0, 10.0)));
    assert_eq!(engine.state().vertex_count(), 3);
    assert_eq!(engine.nets().len(), 1);
    assert_normalized(engine.state(), EPS);
}

#[test]
fn invalid_ids_are_silent_noops() {
    let mut engine = WireEngine::new();
    engine.connect_points(p(0.0, 0.0), p(10.0, 0.0));
    let snapshot = engine.state().clone();
    let ghost = wire_core::VertexId::new();
    assert!(!engine.move_vertex(ghost, p(5.0, 5.0)));
    assert!(engine.last_delta().is_empty());
    assert_eq!(engine.delete_items([ghost], []), 0);
    assert!(engine.connect_points(p(3.0, 3.0), p(3.0, 3.0)).is_empty());
    assert_eq!(engine.state(), &snapshot);
}

#[test]
fn free_geometry_collapses_diagonal_runs() {
    let mut engine =
        WireEngine::with_geometry(EngineConfig::default(), Box::new(FreeGeometry::default()));
    engine.connect_points(p(0.0, 0.0), p(10.0, 10.0));
    engine.connect_points(p(10.0, 10.0), p(20.0, 20.0));
    assert_eq!(sorted_points(engine.state()), vec![p(0.0, 0.0), p(20.0, 20.0)]);

    engine.connect_points(p(20.0, 20.0), p(30.0, 25.0));
    assert_eq!(engine.state().vertex_count(), 3);
    assert_eq!(engine.state().edge_count(), 2);
}

#[test]
fn duplicate_rule_names_are_rejected() {
    let mut rules = Ruleset::orthogonal();
    let err = rules.register(Box::new(CollapseLinearRuns)).unwrap_err();
    assert_eq!(err, EngineError::DuplicateRuleName("collapse_linear_runs"));
    assert_eq!(rules.len(), 4);
}

fn zero_length_edges(engine: &WireEngine) -> usize {
    engine
        .state()
        .edges()
        .filter_map(|e| engine.state().segment(e.id))
        .filter(|(a, b)| a.approx_eq(*b, EPS))
        .count()
}

#[test]
fn a_point_holds_one_pin() {
    let mut engine = WireEngine::new();
    let (r1, r2, pin) = (OwnerId::new(), OwnerId::new(), PinId::new());
    let first = engine.get_or_create_pin_vertex(r1, pin, p(10.0, 0.0)).expect("first pin");
    assert_eq!(engine.get_or_create_pin_vertex(r2, pin, p(10.0, 0.0)), None);
    assert_eq!(engine.find_vertex(r2, pin), None);

    engine.connect_points(p(0.0, 0.0), p(20.0, 0.0));
    assert_eq!(engine.state().vertex_count(), 3);
    assert_eq!(engine.state().edge_count(), 2);
    assert_eq!(engine.state().degree(first), 2);
    assert_eq!(zero_length_edges(&engine), 0);
    assert_eq!(violations(engine.state(), EPS), vec![]);
    for wire in engine.to_wires() {
        assert!(wire.segments.iter().all(|s| s.start != s.end));
    }

    let second = engine.get_or_create_pin_vertex(r2, pin, p(10.0, 20.0)).expect("second pin");
    assert!(!engine.move_vertex(second, p(10.0, 0.0)));
    assert_eq!(engine.get_or_create_pin_vertex(r2, pin, p(10.0, 0.0)), None);
    assert_eq!(engine.state().point(second), Some(p(10.0, 20.0)));
    assert_eq!(engine.find_vertex(r1, pin), Some(first));
    assert_normalized(engine.state(), EPS);
}

#[test]
fn stacked_pins_in_a_loaded_state_are_fused() {
    let (r1, r2, pin) = (OwnerId::new(), OwnerId::new(), PinId::new());
    let mut b = StateBuilder::new();
    let first = b.pin(r1, pin, 10.0, 0.0);
    let second = b.pin(r2, pin, 10.0, 0.0);
    b.path(&[(0.0, 0.0), (20.0, 0.0)]);
    let engine = b.into_engine();

    assert_normalized(engine.state(), EPS);
    assert_eq!(engine.state().vertex_count(), 3);
    assert_eq!(engine.state().edge_count(), 2);
    assert_eq!(zero_length_edges(&engine), 0);
    let survivor = first.min(second);
    assert_eq!(engine.state().degree(survivor), 2);
    let bound: Vec<_> = [r1, r2].iter().filter_map(|o| engine.find_vertex(*o, pin)).collect();
    assert_eq!(bound, vec![survivor]);
}

#[test]
fn split_chains_stacked_vertices_once() {
    let mut rules = Ruleset::new();
    rules.register(Box::new(SplitEdgesAtPassingVertices)).expect("fresh ruleset");
    let mut engine =
        ResolutionEngine::new(Box::new(ManhattanGrid::new(10.0, EPS))).with_ruleset(rules);
    let mut b = StateBuilder::new();
    b.pin(OwnerId::new(), PinId::new(), 10.0, 0.0);
    b.pin(OwnerId::new(), PinId::new(), 10.0, 0.0);
    b.path(&[(0.0, 0.0), (20.0, 0.0)]);
    engine.execute(&mut LoadState::full(b.build()));

    let state = engine.state();
    assert_eq!(state.edge_count(), 2);
    assert!(state
        .edges()
        .filter_map(|e| state.segment(e.id))
        .all(|(a, z)| !a.approx_eq(z, EPS)));
}
