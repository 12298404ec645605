use serde::{Deserialize, Serialize};

/// Per-source OCR lifecycle. Independent from whether region data exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl OverlayStatus {
    /// Loading and error states always show their status icon.
    pub fn shows_icon(&self) -> bool {
        matches!(self, OverlayStatus::Loading | OverlayStatus::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayStatus::Idle => "idle",
            OverlayStatus::Loading => "loading",
            OverlayStatus::Success => "success",
            OverlayStatus::Error => "error",
        }
    }
}

/// Chapter preprocessing state as reported by the OCR server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ChapterStatus {
    #[default]
    Idle,
    Processing {
        #[serde(default)]
        progress: u32,
        #[serde(default)]
        total: u32,
    },
    Processed,
}
