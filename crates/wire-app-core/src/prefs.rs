// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persisted engine preferences shared by wiring tools.

use serde::{Deserialize, Serialize};
use wire_core::geom::RoutePreference;
use wire_core::EngineConfig;

use crate::config::{ConfigError, ConfigService, ConfigStore};

/// Store key under which [`WirePrefs`] are persisted.
pub const PREFS_KEY: &str = "wire-prefs";

/// Saved preferences for the wiring engine.
///
/// Every field has a default, so documents written by older tools still
/// load. Values read from disk are untrusted; run them through
/// [`WirePrefs::sanitized`] before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WirePrefs {
    /// Snapping grid spacing; `0.0` disables snapping.
    pub grid_step: f64,
    /// Point comparison tolerance.
    pub epsilon: f64,
    /// Rescan margin around edited vertices.
    pub neighborhood_margin: f64,
    /// Prefix of synthesized net names.
    pub net_name_prefix: String,
    /// Routing used by `connect` when the caller does not pick one.
    pub default_routing: RoutePreference,
}

impl Default for WirePrefs {
    fn default() -> Self {
        EngineConfig::default().into()
    }
}

impl WirePrefs {
    /// Replaces out-of-range values with their defaults.
    ///
    /// `grid_step` and `neighborhood_margin` must be finite and non-negative,
    /// `epsilon` finite and positive, and the prefix non-blank.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let fallback = Self::default();
        let non_negative = |v: f64, d: f64| if v.is_finite() && v >= 0.0 { v } else { d };
        Self {
            grid_step: non_negative(self.grid_step, fallback.grid_step),
            epsilon: if self.epsilon.is_finite() && self.epsilon > 0.0 {
                self.epsilon
            } else {
                fallback.epsilon
            },
            neighborhood_margin: non_negative(
                self.neighborhood_margin,
                fallback.neighborhood_margin,
            ),
            net_name_prefix: if self.net_name_prefix.trim().is_empty() {
                fallback.net_name_prefix
            } else {
                self.net_name_prefix
            },
            default_routing: self.default_routing,
        }
    }
}

impl From<EngineConfig> for WirePrefs {
    fn from(config: EngineConfig) -> Self {
        Self {
            grid_step: config.grid_step,
            epsilon: config.epsilon,
            neighborhood_margin: config.neighborhood_margin,
            net_name_prefix: config.net_name_prefix,
            default_routing: config.default_routing,
        }
    }
}

impl From<WirePrefs> for EngineConfig {
    fn from(prefs: WirePrefs) -> Self {
        let prefs = prefs.sanitized();
        Self {
            grid_step: prefs.grid_step,
            epsilon: prefs.epsilon,
            neighborhood_margin: prefs.neighborhood_margin,
            net_name_prefix: prefs.net_name_prefix,
            default_routing: prefs.default_routing,
        }
    }
}

/// Loads the saved prefs (sanitized), or the defaults when none are saved.
pub fn load_prefs<S: ConfigStore>(service: &ConfigService<S>) -> Result<WirePrefs, ConfigError> {
    Ok(service.load_or_default::<WirePrefs>(PREFS_KEY)?.sanitized())
}

/// Persists `prefs` under [`PREFS_KEY`].
pub fn save_prefs<S: ConfigStore>(
    service: &ConfigService<S>,
    prefs: &WirePrefs,
) -> Result<(), ConfigError> {
    service.save(PREFS_KEY, prefs)
}
