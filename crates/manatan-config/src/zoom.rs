use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_min_scale() -> f64 {
    1.0
}

fn default_max_scale() -> f64 {
    5.0
}

fn default_double_tap_scale() -> f64 {
    2.5
}

fn default_snap_threshold() -> f64 {
    0.1
}

fn default_double_tap_delay_ms() -> u64 {
    300
}

fn default_double_tap_distance() -> f64 {
    50.0
}

/// Pinch/double-tap zoom of the reader content.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ZoomConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Treat the device as touch-first even without a mobile user agent
    pub mobile_mode: bool,
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
    #[serde(default = "default_double_tap_scale")]
    pub double_tap_scale: f64,
    #[serde(default = "default_snap_threshold")]
    pub snap_threshold: f64,
    #[serde(default = "default_double_tap_delay_ms")]
    pub double_tap_delay_ms: u64,
    #[serde(default = "default_double_tap_distance")]
    pub double_tap_distance: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            mobile_mode: false,
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            double_tap_scale: default_double_tap_scale(),
            snap_threshold: default_snap_threshold(),
            double_tap_delay_ms: default_double_tap_delay_ms(),
            double_tap_distance: default_double_tap_distance(),
        }
    }
}
