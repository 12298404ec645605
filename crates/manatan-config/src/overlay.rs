use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextOrientationMode {
    /// Tall boxes are vertical, everything else horizontal
    #[default]
    Smart,
    ForceVertical,
    ForceHorizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKey {
    Alt,
    Control,
    Shift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    Hover,
    Click,
}

fn default_enabled() -> bool {
    true
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_delete_key() -> ModifierKey {
    ModifierKey::Control
}

fn default_merge_key() -> ModifierKey {
    ModifierKey::Alt
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OverlayConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub text_orientation: TextOrientationMode,
    #[serde(default = "default_multiplier")]
    pub font_multiplier_vertical: f64,
    #[serde(default = "default_multiplier")]
    pub font_multiplier_horizontal: f64,
    /// Extra pixels around each region box
    pub bounding_box_adjustment: f64,
    #[serde(default = "default_delete_key")]
    pub delete_modifier: ModifierKey,
    #[serde(default = "default_merge_key")]
    pub merge_modifier: ModifierKey,
    pub interaction_mode: InteractionMode,
    pub solo_hover_mode: bool,
    pub debug_mode: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            text_orientation: TextOrientationMode::default(),
            font_multiplier_vertical: default_multiplier(),
            font_multiplier_horizontal: default_multiplier(),
            bounding_box_adjustment: 0.0,
            delete_modifier: default_delete_key(),
            merge_modifier: default_merge_key(),
            interaction_mode: InteractionMode::default(),
            solo_hover_mode: false,
            debug_mode: false,
        }
    }
}
