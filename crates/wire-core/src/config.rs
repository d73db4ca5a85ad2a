// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Engine configuration.
use wire_geom::{ManhattanGrid, RoutePreference};

/// Tunables for a [`crate::WireEngine`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Snapping grid spacing; `0.0` disables snapping.
    pub grid_step: f64,
    /// Tolerance for every point comparison.
    pub epsilon: f64,
    /// Margin added around the epicenter bounds when rules rescan.
    pub neighborhood_margin: f64,
    /// Prefix of synthesized net names (`N$` gives `N$1a2b3c4d`).
    pub net_name_prefix: String,
    /// Routing used when the caller does not choose one.
    pub default_routing: RoutePreference,
}

impl EngineConfig {
    /// Manhattan grid described by this configuration.
    #[must_use]
    pub fn geometry(&self) -> ManhattanGrid {
        ManhattanGrid::new(self.grid_step, self.epsilon)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_step: 1.0,
            epsilon: 1e-6,
            neighborhood_margin: 2.0,
            net_name_prefix: "N$".to_owned(),
            default_routing: RoutePreference::HorizontalFirst,
        }
    }
}
