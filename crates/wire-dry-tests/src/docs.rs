// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canned wire documents with fixed ids.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use wire_core::geom::Point2;
use wire_core::{AttachmentPoint, ClusterId, OwnerId, PinId, Wire, WireSegment};

/// First resistor of [`CannedDoc::divider`].
pub const R1: OwnerId = OwnerId::from_u128(0x0100);
/// Second resistor of [`CannedDoc::divider`].
pub const R2: OwnerId = OwnerId::from_u128(0x0200);
/// Pin 1 of a two-terminal part.
pub const PIN_1: PinId = PinId::from_u128(0x0001);
/// Pin 2 of a two-terminal part.
pub const PIN_2: PinId = PinId::from_u128(0x0002);

/// A wire list plus the pin positions it refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct CannedDoc {
    /// Pin locations.
    pub pins: BTreeMap<(OwnerId, PinId), Point2>,
    /// Persisted wires.
    pub wires: Vec<Wire>,
}

fn at(x: f64, y: f64) -> AttachmentPoint {
    AttachmentPoint::free(Point2::new(x, y))
}

fn net(n: u128) -> ClusterId {
    ClusterId::from_u128(n)
}

impl CannedDoc {
    /// Two resistors and three nets, already in normal form.
    ///
    /// ```text
    ///  (-30,0)──R1.1 (0,0)   R1.2 (40,0)──────R2.1 (100,0)
    ///                                          R2.2 (100,40)
    ///                                            │
    ///  (0,80)────────────────────────────────(100,80)
    /// ```
    pub fn divider() -> Self {
        let pins = BTreeMap::from([
            ((R1, PIN_1), Point2::new(0.0, 0.0)),
            ((R1, PIN_2), Point2::new(40.0, 0.0)),
            ((R2, PIN_1), Point2::new(100.0, 0.0)),
            ((R2, PIN_2), Point2::new(100.0, 40.0)),
        ]);
        let wires = vec![
            Wire::new(
                net(0xA1),
                vec![WireSegment::new(AttachmentPoint::pin(R1, PIN_1), at(-30.0, 0.0))],
            ),
            Wire::new(
                net(0xA2),
                vec![WireSegment::new(
                    AttachmentPoint::pin(R1, PIN_2),
                    AttachmentPoint::pin(R2, PIN_1),
                )],
            )
            .with_label("MID"),
            Wire::new(
                net(0xA3),
                vec![
                    WireSegment::new(AttachmentPoint::pin(R2, PIN_2), at(100.0, 80.0)),
                    WireSegment::new(at(0.0, 80.0), at(100.0, 80.0)),
                ],
            )
            .with_label("GND"),
        ];
        Self { pins, wires }
    }

    /// A labelled bus drawn in three collinear pieces plus a stub wire whose
    /// end lands mid-bus. Normalizes to one net of three segments:
    /// `(0,0)-(15,0)`, `(15,0)-(30,0)` and `(15,0)-(15,10)`.
    pub fn messy_bus() -> Self {
        let wires = vec![
            Wire::new(
                net(0xB1),
                vec![
                    WireSegment::new(at(0.0, 0.0), at(10.0, 0.0)),
                    WireSegment::new(at(10.0, 0.0), at(20.0, 0.0)),
                    WireSegment::new(at(20.0, 0.0), at(30.0, 0.0)),
                ],
            )
            .with_label("BUS"),
            Wire::new(net(0xB2), vec![WireSegment::new(at(15.0, 0.0), at(15.0, 10.0))]),
        ];
        Self { pins: BTreeMap::new(), wires }
    }

    /// Document in the CLI's JSON shape:
    /// `{ "pins": [{component, pin, x, y}], "wires": [...] }`.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        let pins: Vec<Value> = self
            .pins
            .iter()
            .map(|((component, pin), p)| {
                json!({ "component": component, "pin": pin, "x": p.x, "y": p.y })
            })
            .collect();
        Ok(json!({ "pins": pins, "wires": serde_json::to_value(&self.wires)? }))
    }
}
