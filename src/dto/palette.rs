use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use crate::color::{
    Color, ColorRole,
    ratio::{RatioMode, SliderConstraints},
    space::{contrast_text_color, display_hex},
};
use crate::dto::validation::validate_hex_color;

/// A palette color as exposed to clients.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct ColorDto {
    /// Canonical display form, `#RRGGBB` uppercase.
    pub hex: String,
    /// Semantic role.
    pub role: ColorRole,
    /// Display label.
    pub label: Option<String>,
    /// Target usage share; cosmetic for neutrals.
    pub ratio: Option<f64>,
    /// True once the ratio was manually set.
    pub is_custom_ratio: bool,
    /// True while the ratio is excluded from redistribution.
    pub is_locked: bool,
    /// True for system-generated neutrals.
    pub is_auto: bool,
    /// Black or white, whichever reads better on this color.
    pub text_color: String,
}

impl From<&Color> for ColorDto {
    fn from(color: &Color) -> Self {
        Self {
            hex: display_hex(&color.hex),
            role: color.role,
            label: color.label.clone(),
            ratio: color.ratio,
            is_custom_ratio: color.is_custom_ratio,
            is_locked: color.is_locked,
            is_auto: color.is_auto,
            text_color: contrast_text_color(&color.hex).to_string(),
        }
    }
}

/// Full editor state returned by `GET /palette`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaletteSnapshot {
    /// Ordered color list, auto neutrals included.
    pub colors: Vec<ColorDto>,
    /// Collection-level ratio mode.
    pub mode: RatioMode,
    /// Whether system neutrals are maintained automatically.
    pub auto_neutrals: bool,
    /// True when the pipeline API is unreachable.
    pub degraded: bool,
}

/// Request body for adding a color.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddColorRequest {
    /// Hex value, `#RGB` or `#RRGGBB`.
    #[validate(custom(function = validate_hex_color))]
    pub hex: String,
    /// Target role.
    pub role: ColorRole,
    /// Optional display label; derived from hue when omitted.
    pub label: Option<String>,
    /// Acknowledges the soft palette-size warning.
    #[serde(default)]
    pub confirm: bool,
}

/// Request body for partially updating a color; omitted fields are untouched.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateColorRequest {
    /// Replacement hex value.
    #[validate(custom(function = validate_hex_color))]
    pub hex: Option<String>,
    /// Replacement role.
    pub role: Option<ColorRole>,
    /// Replacement label.
    pub label: Option<String>,
}

/// Request body for a ratio-slider update.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RatioUpdateRequest {
    /// New ratio value.
    #[validate(range(min = 0.0, max = 1.0))]
    pub ratio: f64,
    /// False during a live drag, true on drag end; only a commit
    /// renormalizes the rest of the palette.
    #[serde(default)]
    pub commit: bool,
}

/// Request body for toggling a color's redistribution lock.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LockRequest {
    /// Desired lock state.
    pub locked: bool,
}

/// Request body for toggling automatic neutral maintenance.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AutoNeutralsRequest {
    /// Desired auto-neutral state.
    pub enabled: bool,
}

/// Slider bounds for one color, returned by the slider-constraints route.
#[derive(Debug, Serialize, ToSchema)]
pub struct SliderConstraintsDto {
    /// Lower bound.
    pub min: f64,
    /// Upper bound given the other colors' locks.
    pub max: f64,
    /// Whether the control should be non-interactive.
    pub disabled: bool,
}

impl From<SliderConstraints> for SliderConstraintsDto {
    fn from(constraints: SliderConstraints) -> Self {
        Self {
            min: constraints.min,
            max: constraints.max,
            disabled: constraints.disabled,
        }
    }
}
