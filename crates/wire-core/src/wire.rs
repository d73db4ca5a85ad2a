// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persisted wire format.
//!
//! A document stores wires, not the graph: one [`Wire`] per net, each a bag
//! of straight segments whose ends are either free points or component pins.
//! [`crate::WireEngine::build`] turns wires into a normalized graph and
//! [`crate::WireEngine::to_wires`] derives them back.
use std::cmp::Ordering;
use std::collections::BTreeMap;

use wire_geom::Point2;

use crate::ident::{ClusterId, OwnerId, PinId};

/// One end of a persisted segment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum AttachmentPoint {
    /// A point in schematic space.
    Free {
        /// Location.
        at: Point2,
    },
    /// A pin of a component instance; its location comes from a
    /// [`PinLocator`] when the document is loaded.
    Pin {
        /// Component instance.
        component: OwnerId,
        /// Pin within the component.
        pin: PinId,
    },
}

impl AttachmentPoint {
    /// Free attachment at `at`.
    #[must_use]
    pub const fn free(at: Point2) -> Self {
        Self::Free { at }
    }

    /// Pin attachment.
    #[must_use]
    pub const fn pin(component: OwnerId, pin: PinId) -> Self {
        Self::Pin { component, pin }
    }

    /// Resolves the attachment to a point.
    pub fn resolve(&self, pins: &dyn PinLocator) -> Option<Point2> {
        match *self {
            Self::Free { at } => Some(at),
            Self::Pin { component, pin } => pins.locate(component, pin),
        }
    }

    /// Total order used to canonicalize derived wires: pins before free
    /// points, pins by id, points by coordinates.
    fn canonical_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Pin { component: ca, pin: pa }, Self::Pin { component: cb, pin: pb }) => {
                (ca, pa).cmp(&(cb, pb))
            }
            (Self::Pin { .. }, Self::Free { .. }) => Ordering::Less,
            (Self::Free { .. }, Self::Pin { .. }) => Ordering::Greater,
            (Self::Free { at: a }, Self::Free { at: b }) => {
                a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
            }
        }
    }
}

/// Straight segment between two attachments.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WireSegment {
    /// First end.
    pub start: AttachmentPoint,
    /// Second end.
    pub end: AttachmentPoint,
}

impl WireSegment {
    /// Segment between two attachments.
    #[must_use]
    pub const fn new(start: AttachmentPoint, end: AttachmentPoint) -> Self {
        Self { start, end }
    }

    /// Segment between two free points.
    #[must_use]
    pub const fn between(a: Point2, b: Point2) -> Self {
        Self::new(AttachmentPoint::free(a), AttachmentPoint::free(b))
    }

    /// Same segment with its ends in canonical order.
    #[must_use]
    pub fn canonical(self) -> Self {
        if self.start.canonical_cmp(&self.end) == Ordering::Greater {
            Self { start: self.end, end: self.start }
        } else {
            self
        }
    }

    pub(crate) fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.start.canonical_cmp(&other.start).then_with(|| self.end.canonical_cmp(&other.end))
    }
}

/// A named net: every segment of one connected component.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wire {
    /// Net identity, kept stable across edits.
    pub net: ClusterId,
    /// User-assigned net name.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub label: Option<String>,
    /// Segments of the net.
    pub segments: Vec<WireSegment>,
}

impl Wire {
    /// Unlabelled wire.
    #[must_use]
    pub fn new(net: ClusterId, segments: Vec<WireSegment>) -> Self {
        Self { net, label: None, segments }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Answers where a component pin currently sits.
pub trait PinLocator {
    /// Location of `pin` on `component`, or `None` if unknown.
    fn locate(&self, component: OwnerId, pin: PinId) -> Option<Point2>;
}

impl PinLocator for BTreeMap<(OwnerId, PinId), Point2> {
    fn locate(&self, component: OwnerId, pin: PinId) -> Option<Point2> {
        self.get(&(component, pin)).copied()
    }
}

impl<F> PinLocator for F
where
    F: Fn(OwnerId, PinId) -> Option<Point2>,
{
    fn locate(&self, component: OwnerId, pin: PinId) -> Option<Point2> {
        self(component, pin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_puts_pins_first() {
        let pin = AttachmentPoint::pin(OwnerId::new(), PinId::new());
        let seg = WireSegment::new(AttachmentPoint::free(Point2::ZERO), pin).canonical();
        assert_eq!(seg.start, pin);
    }

    #[test]
    fn closures_and_maps_locate_pins() {
        let (c, p) = (OwnerId::new(), PinId::new());
        let map = BTreeMap::from([((c, p), Point2::new(3.0, 4.0))]);
        let closure = |_: OwnerId, _: PinId| Some(Point2::new(3.0, 4.0));
        let at = AttachmentPoint::pin(c, p);
        assert_eq!(at.resolve(&map), Some(Point2::new(3.0, 4.0)));
        assert_eq!(at.resolve(&closure), at.resolve(&map));
        let nowhere: BTreeMap<(OwnerId, PinId), Point2> = BTreeMap::new();
        assert_eq!(at.resolve(&nowhere), None);
    }
}
