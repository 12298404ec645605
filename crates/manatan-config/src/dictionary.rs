use manatan_types::GroupingMode;
use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Plain clicks on text trigger a lookup
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub grouping_mode: GroupingMode,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            grouping_mode: GroupingMode::default(),
        }
    }
}
