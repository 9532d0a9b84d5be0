use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::color::{ColorRole, harmony::Suggestion, space::display_hex};
use crate::dto::validation::validate_hex_color;

/// Query parameters for the harmony-suggestion route.
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct SuggestionQuery {
    /// Base color the candidates are derived from.
    #[validate(custom(function = validate_hex_color))]
    pub base_color: String,
    /// Role the suggestions should fill.
    pub target_role: ColorRole,
    /// Hue offset for analogous candidates, in degrees.
    pub offset: Option<f64>,
}

/// A single candidate color.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SuggestionDto {
    /// Candidate hex value, uppercase.
    pub hex: String,
    /// How the candidate was derived.
    pub label: String,
}

impl From<Suggestion> for SuggestionDto {
    fn from(suggestion: Suggestion) -> Self {
        Self {
            hex: display_hex(&suggestion.hex),
            label: suggestion.label,
        }
    }
}

/// Where a suggestion batch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    /// Curated by the pipeline API.
    Pipeline,
    /// Generated locally because the pipeline was unreachable.
    Local,
}

/// Response of the harmony-suggestion route.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestionsResponse {
    /// Candidates, already filtered against the current palette.
    pub suggestions: Vec<SuggestionDto>,
    /// Origin of the batch.
    pub source: SuggestionSource,
}

/// A color extracted from an uploaded image by the pipeline.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExtractedColor {
    /// Extracted hex value.
    pub hex: String,
    /// Role suggested by the pipeline, if any.
    pub role: Option<ColorRole>,
    /// Label suggested by the pipeline, if any.
    pub label: Option<String>,
}

/// Response of the image color-extraction route.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExtractColorsResponse {
    /// Colors found in the uploaded image.
    pub colors: Vec<ExtractedColor>,
}
