use serde::{Deserialize, Serialize};

fn default_selectors() -> Vec<String> {
    vec![
        ".reader-page img".to_string(),
        "[data-page-index]".to_string(),
    ]
}

fn default_fallback_selector() -> String {
    r#"img[src*="/chapter/"]"#.to_string()
}

/// Where to look for page images in the host document.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SiteConfig {
    #[serde(default = "default_selectors")]
    pub image_container_selectors: Vec<String>,
    #[serde(default = "default_fallback_selector")]
    pub fallback_selector: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            image_container_selectors: default_selectors(),
            fallback_selector: default_fallback_selector(),
        }
    }
}
