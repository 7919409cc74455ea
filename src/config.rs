/// Engine tunables.
///
/// The source material leaves two knobs operationally open: the trend noise
/// threshold and the alert resolution cooldown. Both are configuration, not
/// constants — facilities with continuous controllers want tighter values
/// than ones running manual test kits.
///
/// # Chosen defaults
/// - `noise_threshold_per_hour`: 0.05 units/hour. Test-kit repeatability is
///   around ±0.1 for chlorine and pH, so a slope under 0.05/h across a
///   multi-reading window is indistinguishable from measurement noise.
/// - `resolution_cooldown_minutes`: 60. Chemical additions take 30–60
///   minutes to disperse; re-test readings inside that window commonly
///   oscillate across band edges and would flap alerts.

use chrono::Duration;
use serde::Deserialize;

use crate::model::EngineError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum |rate| (units/hour) for a trend to count as real drift
    /// rather than measurement noise.
    pub noise_threshold_per_hour: f64,
    /// Minimum sustained time at safe severity before an open alert
    /// resolves.
    pub resolution_cooldown_minutes: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            noise_threshold_per_hour: 0.05,
            resolution_cooldown_minutes: 60,
        }
    }
}

impl EngineConfig {
    /// Loads config from a TOML document, filling omitted fields with
    /// defaults.
    pub fn from_toml_str(toml_text: &str) -> Result<EngineConfig, EngineError> {
        toml::from_str(toml_text)
            .map_err(|e| EngineError::ConfigError(format!("engine config parse error: {}", e)))
    }

    /// The resolution cooldown as a chrono `Duration`.
    pub fn resolution_cooldown(&self) -> Duration {
        Duration::minutes(self.resolution_cooldown_minutes)
    }
}
