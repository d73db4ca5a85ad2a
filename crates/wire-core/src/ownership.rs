// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Vertex ownership tags.
//!
//! Ownership is what binds a graph vertex to something outside the graph
//! (a pin of a component instance). The graph stores the tag in a side table
//! keyed by vertex id and never interprets it; policies and the owning
//! [`crate::WireEngine`] give it meaning.
use crate::ident::{OwnerId, PinId};

/// Ownership tag of a vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Ownership {
    /// Ordinary routing point with no external meaning.
    #[default]
    Free,
    /// Bound to `pin` of component instance `owner`; never merged away or
    /// deleted while bound.
    Pin {
        /// Component instance that owns the pin.
        owner: OwnerId,
        /// Pin within the owner.
        pin: PinId,
    },
    /// Drag-only tag: a pin vertex pulled off its axis and temporarily
    /// treated as a free point. Its binding lives on a stationary twin.
    DetachedPin {
        /// Component instance that owned the pin.
        owner: OwnerId,
        /// Pin within the owner.
        pin: PinId,
    },
}

impl Ownership {
    /// Returns `true` for [`Ownership::Free`].
    #[must_use]
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }

    /// Returns `true` for a bound [`Ownership::Pin`].
    #[must_use]
    pub fn is_pin(&self) -> bool {
        matches!(self, Self::Pin { .. })
    }

    /// Returns the `(owner, pin)` binding of a bound pin.
    #[must_use]
    pub fn pin_binding(&self) -> Option<(OwnerId, PinId)> {
        match *self {
            Self::Pin { owner, pin } => Some((owner, pin)),
            Self::Free | Self::DetachedPin { .. } => None,
        }
    }

    /// Returns the owner for both bound and detached pins.
    #[must_use]
    pub fn owner(&self) -> Option<OwnerId> {
        match *self {
            Self::Pin { owner, .. } | Self::DetachedPin { owner, .. } => Some(owner),
            Self::Free => None,
        }
    }
}
