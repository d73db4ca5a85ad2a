// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier types.
//!
//! Every entity in the wiring graph is addressed by a random (v4) UUID
//! wrapped in a dedicated newtype so vertex, edge, cluster, owner and pin ids
//! cannot be mixed up. Ordering follows the UUID byte order and is what the
//! rules use for deterministic tie-breaking.
use core::fmt;

use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(Uuid);

        impl $name {
            /// Mints a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Builds an identifier from a raw 128-bit value (fixtures, replay).
            #[must_use]
            pub const fn from_u128(value: u128) -> Self {
                Self(Uuid::from_u128(value))
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// First eight hex digits, for logs and synthesized names.
            #[must_use]
            pub fn short(&self) -> String {
                let mut buf = Uuid::encode_buffer();
                let full = self.0.simple().encode_lower(&mut buf);
                full.chars().take(8).collect()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.short())
            }
        }
    };
}

uuid_id!(
    /// Identifier of a vertex (a point of the wiring graph).
    VertexId,
    "v"
);
uuid_id!(
    /// Identifier of an edge (a straight wire segment).
    EdgeId,
    "e"
);
uuid_id!(
    /// Identifier of a cluster, i.e. an electrical net.
    ClusterId,
    "net"
);
uuid_id!(
    /// Identifier of the external object owning pins (a component instance).
    OwnerId,
    "owner"
);
uuid_id!(
    /// Identifier of a pin within its owner.
    PinId,
    "pin"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_distinct() {
        assert_ne!(VertexId::new(), VertexId::new());
    }

    #[test]
    fn ordering_follows_raw_value() {
        assert!(EdgeId::from_u128(1) < EdgeId::from_u128(2));
    }

    #[test]
    fn display_uses_prefix_and_short_form() {
        let id = ClusterId::from_u128(0xabcd_ef01_0000_0000_0000_0000_0000_0000);
        assert_eq!(id.to_string(), "net:abcdef01");
    }
}
