use serde::{Deserialize, Serialize};

fn default_jimaku_url() -> String {
    "https://jimaku.cc/api".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SubtitleConfig {
    /// Shifts cue timing; positive shows captions earlier
    pub offset_ms: i64,
    pub jimaku_api_key: String,
    #[serde(default = "default_jimaku_url")]
    pub jimaku_url: String,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            offset_ms: 0,
            jimaku_api_key: String::new(),
            jimaku_url: default_jimaku_url(),
        }
    }
}
