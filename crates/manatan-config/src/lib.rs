use std::env;

use serde::{Deserialize, Serialize};

use self::dictionary::DictionaryConfig;
use self::network::NetworkConfig;
use self::ocr::OcrConfig;
use self::overlay::OverlayConfig;
use self::site::SiteConfig;
use self::subtitle::SubtitleConfig;
use self::zoom::ZoomConfig;

pub mod dictionary;
pub mod network;
pub mod ocr;
pub mod overlay;
pub mod site;
pub mod subtitle;
pub mod zoom;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub ocr: OcrConfig,
    pub overlay: OverlayConfig,
    pub zoom: ZoomConfig,
    pub site: SiteConfig,
    pub dictionary: DictionaryConfig,
    pub subtitle: SubtitleConfig,

    /// Event loop tick
    pub delta_time: u64,
    /// Chapter status re-poll interval
    pub chapter_poll_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            ocr: OcrConfig::default(),
            overlay: OverlayConfig::default(),
            zoom: ZoomConfig::default(),
            site: SiteConfig::default(),
            dictionary: DictionaryConfig::default(),
            subtitle: SubtitleConfig::default(),
            delta_time: 100,
            chapter_poll_ms: 2000,
        }
    }
}

impl Config {
    /// Defaults with environment overrides applied.
    pub fn new() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_json::from_str(json)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Environment wins over file values.
    pub fn apply_env(&mut self) {
        self.network.apply_env();

        if let Some(ms) = env::var("DELTA_TIME_MS").ok().and_then(|v| v.parse().ok()) {
            self.delta_time = ms;
        }

        if let Some(ms) = env::var("MANATAN_CHAPTER_POLL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.chapter_poll_ms = ms;
        }

        if let Ok(key) = env::var("MANATAN_JIMAKU_API_KEY") {
            self.subtitle.jimaku_api_key = key;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zoom.min_scale <= 0.0 || self.zoom.min_scale > self.zoom.max_scale {
            return Err(ConfigError::InvalidValue {
                field: "zoom.min_scale",
                reason: format!(
                    "must be positive and not above max_scale ({} > {})",
                    self.zoom.min_scale, self.zoom.max_scale
                ),
            });
        }

        if !(self.zoom.min_scale..=self.zoom.max_scale).contains(&self.zoom.double_tap_scale) {
            return Err(ConfigError::InvalidValue {
                field: "zoom.double_tap_scale",
                reason: format!("{} is outside the scale range", self.zoom.double_tap_scale),
            });
        }

        if self.overlay.font_multiplier_vertical <= 0.0
            || self.overlay.font_multiplier_horizontal <= 0.0
        {
            return Err(ConfigError::InvalidValue {
                field: "overlay.font_multiplier",
                reason: "multipliers must be positive".to_string(),
            });
        }

        if !self.network.server_url.starts_with("http") {
            return Err(ConfigError::InvalidValue {
                field: "network.server_url",
                reason: format!("'{}' is not an http(s) URL", self.network.server_url),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"ocr":{"add_space_on_merge":true},"zoom":{"max_scale":4.0}}"#)
                .unwrap();
        assert!(config.ocr.add_space_on_merge);
        assert_eq!(config.zoom.max_scale, 4.0);
        assert_eq!(config.zoom.min_scale, 1.0);
        assert_eq!(config.overlay.font_multiplier_vertical, 1.0);
        assert_eq!(config.chapter_poll_ms, 2000);
    }

    #[test]
    fn validate_rejects_inverted_scale_range() {
        let mut config = Config::default();
        config.zoom.min_scale = 6.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "zoom.min_scale",
                ..
            })
        ));
    }

    #[test]
    fn defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }
}
