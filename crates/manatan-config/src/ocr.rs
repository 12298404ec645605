use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_ocr_path() -> String {
    "/api/ocr/ocr".to_string()
}

fn default_lookup_path() -> String {
    "/api/yomitan/lookup".to_string()
}

fn default_status_path() -> String {
    "/api/ocr/is-chapter-preprocessed".to_string()
}

fn default_preprocess_path() -> String {
    "/api/ocr/preprocess-chapter".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OcrConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Merge separator: a visible space instead of the zero-width marker
    #[serde(default)]
    pub add_space_on_merge: bool,
    #[serde(default = "default_ocr_path")]
    pub ocr_path: String,
    #[serde(default = "default_lookup_path")]
    pub lookup_path: String,
    #[serde(default = "default_status_path")]
    pub chapter_status_path: String,
    #[serde(default = "default_preprocess_path")]
    pub chapter_preprocess_path: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            add_space_on_merge: false,
            ocr_path: default_ocr_path(),
            lookup_path: default_lookup_path(),
            chapter_status_path: default_status_path(),
            chapter_preprocess_path: default_preprocess_path(),
        }
    }
}
