// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! `build` / `to_wires` against canned documents.

mod common;

use std::collections::BTreeMap;

use common::{p, EPS};
use wire_core::geom::Point2;
use wire_core::{BuildReport, ClusterId, OwnerId, PinId, WireEngine, WireSegment};
use wire_dry_tests::docs::{PIN_1, PIN_2, R1, R2};
use wire_dry_tests::{assert_normalized, CannedDoc};

#[test]
fn normalized_document_round_trips_exactly() {
    let doc = CannedDoc::divider();
    let mut engine = WireEngine::new();
    let report = engine.build(&doc.wires, &doc.pins);
    assert_eq!(report, BuildReport { loaded: 4, skipped: 0 });
    assert_normalized(engine.state(), EPS);
    assert_eq!(engine.to_wires(), doc.wires);

    let mut again = WireEngine::new();
    again.build(&engine.to_wires(), &doc.pins);
    assert_eq!(again.to_wires(), doc.wires);
}

#[test]
fn build_binds_pins_and_labels_nets() {
    let doc = CannedDoc::divider();
    let mut engine = WireEngine::new();
    engine.build(&doc.wires, &doc.pins);

    let r1 = engine.find_vertex(R1, PIN_1).expect("R1.1 bound");
    assert_eq!(engine.state().point(r1), Some(p(0.0, 0.0)));
    let mid = ClusterId::from_u128(0xA2);
    assert_eq!(engine.net_name(mid), "MID");
    assert_eq!(engine.pins_on_net(mid), vec![(R1, PIN_2), (R2, PIN_1)]);
    assert_eq!(engine.nets().len(), 3);
}

#[test]
fn messy_document_normalizes() {
    let doc = CannedDoc::messy_bus();
    let mut engine = WireEngine::new();
    engine.build(&doc.wires, &doc.pins);
    assert_normalized(engine.state(), EPS);

    let wires = engine.to_wires();
    assert_eq!(wires.len(), 1);
    assert_eq!(wires[0].net, ClusterId::from_u128(0xB1));
    assert_eq!(wires[0].label.as_deref(), Some("BUS"));
    assert_eq!(
        wires[0].segments,
        vec![
            WireSegment::between(p(0.0, 0.0), p(15.0, 0.0)),
            WireSegment::between(p(15.0, 0.0), p(15.0, 10.0)),
            WireSegment::between(p(15.0, 0.0), p(30.0, 0.0)),
        ]
    );
}

#[test]
fn unknown_pins_skip_their_segments() {
    let doc = CannedDoc::divider();
    let mut engine = WireEngine::new();
    let nowhere: BTreeMap<(OwnerId, PinId), Point2> = BTreeMap::new();
    let report = engine.build(&doc.wires, &nowhere);
    assert_eq!(report, BuildReport { loaded: 1, skipped: 3 });
    assert_eq!(engine.state().edge_count(), 1);
    assert_eq!(engine.state().vertex_count(), 2);
    assert_eq!(engine.find_vertex(R1, PIN_1), None);
}

#[test]
fn closure_locator_places_pins() {
    let doc = CannedDoc::divider();
    let shifted = |c: OwnerId, pin: PinId| doc.pins.get(&(c, pin)).map(|q| p(q.x, q.y + 1000.0));
    let mut engine = WireEngine::new();
    engine.build(&doc.wires, &shifted);
    let r2 = engine.find_vertex(R2, PIN_2).expect("R2.2 bound");
    assert_eq!(engine.state().point(r2), Some(p(100.0, 1040.0)));
}

#[test]
fn build_replaces_previous_graph() {
    let mut engine = WireEngine::new();
    engine.connect_points(p(500.0, 500.0), p(600.0, 500.0));
    let doc = CannedDoc::messy_bus();
    engine.build(&doc.wires, &doc.pins);
    assert_eq!(engine.nets().len(), 1);
    assert_eq!(engine.state().vertex_count(), 4);
}
