// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON wire documents.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;
use wire_core::geom::Point2;
use wire_core::{OwnerId, PinId, Wire};

/// Where one component pin sits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinEntry {
    /// Component instance.
    pub component: OwnerId,
    /// Pin within the component.
    pub pin: PinId,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

/// Pin locations plus the persisted wires that refer to them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireDoc {
    /// Pin table.
    #[serde(default)]
    pub pins: Vec<PinEntry>,
    /// Wires, one per net.
    #[serde(default)]
    pub wires: Vec<Wire>,
}

impl WireDoc {
    /// Reads and parses a document.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))
    }

    /// Writes the document as pretty JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        fs::write(path, json).with_context(|| format!("write {}", path.display()))
    }

    /// Pin lookup table for [`wire_core::WireEngine::build`]. A pin listed
    /// twice keeps its last location.
    pub fn pin_map(&self) -> BTreeMap<(OwnerId, PinId), Point2> {
        let mut map = BTreeMap::new();
        for entry in &self.pins {
            let at = Point2::new(entry.x, entry.y);
            if map.insert((entry.component, entry.pin), at).is_some() {
                warn!(component = %entry.component, pin = %entry.pin, "pin listed twice");
            }
        }
        map
    }
}
