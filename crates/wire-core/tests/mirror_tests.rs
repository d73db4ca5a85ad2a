// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! The delta-fed net mirror never drifts from a full rebuild.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{p, vertex_at};
use wire_core::geom::Vec2;
use wire_core::{ClusterId, DragSelection, GraphDelta, GraphState, NetMirror, WireEngine};
use wire_dry_tests::docs::{PIN_1, PIN_2, R1, R2};
use wire_dry_tests::CannedDoc;

fn assert_in_sync(engine: &WireEngine) {
    assert_eq!(engine.mirror(), &NetMirror::from_state(engine.state()));
}

#[test]
fn mirror_follows_mixed_edits() {
    let doc = CannedDoc::divider();
    let mut engine = WireEngine::new();
    engine.build(&doc.wires, &doc.pins);
    assert_in_sync(&engine);

    // Bridge MID and GND.
    engine.connect_points(p(70.0, 0.0), p(70.0, 80.0));
    assert_in_sync(&engine);
    assert_eq!(engine.nets().len(), 2);

    let bridge = vertex_at(engine.state(), 70.0, 40.0);
    assert_eq!(bridge, None);
    let top = vertex_at(engine.state(), 70.0, 0.0).expect("tee on MID");
    engine.delete_items([top], []);
    assert_in_sync(&engine);

    let corner = vertex_at(engine.state(), 0.0, 80.0).expect("GND end");
    engine.move_vertex(corner, p(0.0, 60.0));
    assert_in_sync(&engine);

    engine.release_pins(R1);
    assert_in_sync(&engine);
    assert_eq!(engine.find_vertex(R1, PIN_1), None);
}

#[test]
fn mirror_survives_drag_and_cancel() {
    let doc = CannedDoc::divider();
    let mut engine = WireEngine::new();
    engine.build(&doc.wires, &doc.pins);

    assert!(engine.begin_drag(&DragSelection::components([R2])));
    assert!(engine.update_drag(Vec2::new(10.0, 10.0)));
    assert_in_sync(&engine);
    assert!(engine.update_drag(Vec2::new(20.0, -10.0)));
    assert_in_sync(&engine);
    assert!(engine.cancel_drag());
    assert_in_sync(&engine);
    assert_eq!(engine.to_wires(), doc.wires);

    assert!(engine.begin_drag(&DragSelection::components([R2])));
    assert!(engine.update_drag(Vec2::new(0.0, 10.0)));
    assert!(engine.end_drag());
    assert_in_sync(&engine);
}

#[test]
fn pins_on_net_lists_bound_pins() {
    let doc = CannedDoc::divider();
    let mut engine = WireEngine::new();
    engine.build(&doc.wires, &doc.pins);
    let mid = ClusterId::from_u128(0xA2);
    assert_eq!(engine.mirror().pins_on_net(engine.state(), mid), vec![(R1, PIN_2), (R2, PIN_1)]);
    assert_eq!(engine.pins_on_net(ClusterId::from_u128(0xA3)), vec![(R2, PIN_2)]);
    assert!(engine.pins_on_net(ClusterId::from_u128(0xFF)).is_empty());
}

#[test]
fn change_callback_sees_every_commit() {
    let seen = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&seen);
    let mut engine = WireEngine::new();
    engine.set_on_change(Box::new(move |_: &GraphDelta, _: &GraphState| {
        *sink.borrow_mut() += 1;
    }));
    engine.connect_points(p(0.0, 0.0), p(10.0, 0.0));
    engine.connect_points(p(10.0, 0.0), p(10.0, 10.0));
    assert_eq!(*seen.borrow(), 2);
}
