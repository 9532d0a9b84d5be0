use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::color::ratio::RatioMode;
use crate::dto::format_timestamp;
use crate::state::palette::Preset;

/// Request body for saving the current palette as a preset.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SavePresetRequest {
    /// Preset name shown in the preset picker.
    #[validate(length(min = 1, max = 80))]
    pub name: String,
}

/// A stored preset as listed to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct PresetSummary {
    /// Preset identifier.
    pub id: Uuid,
    /// Preset name.
    pub name: String,
    /// Number of colors in the preset, auto neutrals included.
    pub color_count: usize,
    /// Ratio mode at save time.
    pub mode: RatioMode,
    /// RFC 3339 save timestamp.
    pub created_at: String,
}

impl From<&Preset> for PresetSummary {
    fn from(preset: &Preset) -> Self {
        Self {
            id: preset.id,
            name: preset.name.clone(),
            color_count: preset.colors.len(),
            mode: preset.mode,
            created_at: format_timestamp(preset.created_at),
        }
    }
}
