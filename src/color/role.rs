//! Semantic color roles and the per-role rule table.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::color::space::hex_to_hsl;

/// Closed set of semantic roles a palette color can hold.
///
/// Unknown role strings are rejected at the serde boundary; there is no
/// catch-all variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColorRole {
    /// Dominant brand color, nominally 60% of usage.
    Primary,
    /// Supporting color, nominally 30% of usage.
    Secondary,
    /// Highlight color, nominally 10% of usage.
    Accent,
    /// Light background/text neutral, outside ratio accounting.
    NeutralLight,
    /// Dark background/text neutral, outside ratio accounting.
    NeutralDark,
}

impl ColorRole {
    /// All roles, in display order.
    pub const ALL: [ColorRole; 5] = [
        Self::Primary,
        Self::Secondary,
        Self::Accent,
        Self::NeutralLight,
        Self::NeutralDark,
    ];

    /// Whether this role participates in the 60/30/10 ratio accounting.
    pub fn is_core(self) -> bool {
        matches!(self, Self::Primary | Self::Secondary | Self::Accent)
    }
}

impl std::fmt::Display for ColorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Accent => "accent",
            Self::NeutralLight => "neutral_light",
            Self::NeutralDark => "neutral_dark",
        };
        f.write_str(name)
    }
}

/// Immutable per-role rule table injected at construction time, so
/// deployments can tune caps without touching the engine.
#[derive(Debug, Clone)]
pub struct RoleRules {
    caps: [usize; 5],
    base_ratios: [f64; 5],
}

impl RoleRules {
    /// Build a rule table from explicit per-role caps, keeping default base ratios.
    pub fn with_caps(
        primary: usize,
        secondary: usize,
        accent: usize,
        neutral_light: usize,
        neutral_dark: usize,
    ) -> Self {
        Self {
            caps: [primary, secondary, accent, neutral_light, neutral_dark],
            ..Self::default()
        }
    }

    /// Maximum number of colors allowed for a role.
    pub fn max_count(&self, role: ColorRole) -> usize {
        self.caps[Self::index(role)]
    }

    /// Nominal usage share for a role before redistribution.
    pub fn base_ratio(&self, role: ColorRole) -> f64 {
        self.base_ratios[Self::index(role)]
    }

    fn index(role: ColorRole) -> usize {
        match role {
            ColorRole::Primary => 0,
            ColorRole::Secondary => 1,
            ColorRole::Accent => 2,
            ColorRole::NeutralLight => 3,
            ColorRole::NeutralDark => 4,
        }
    }
}

impl Default for RoleRules {
    fn default() -> Self {
        Self {
            caps: [2, 3, 2, 1, 1],
            base_ratios: [0.6, 0.3, 0.1, 0.0, 0.0],
        }
    }
}

/// Suggest a human-readable label for a color from its hue.
///
/// Desaturated colors are named by lightness instead.
pub fn suggest_label(hex: &str) -> String {
    let hsl = hex_to_hsl(hex);

    if hsl.s < 12.0 {
        let name = if hsl.l >= 85.0 {
            "Light Gray"
        } else if hsl.l <= 25.0 {
            "Dark Gray"
        } else {
            "Gray"
        };
        return name.to_string();
    }

    let name = match hsl.h as u32 {
        0..15 | 345..360 => "Red",
        15..45 => "Orange",
        45..70 => "Yellow",
        70..100 => "Lime",
        100..150 => "Green",
        150..180 => "Teal",
        180..195 => "Cyan",
        195..255 => "Blue",
        255..290 => "Purple",
        290..330 => "Magenta",
        _ => "Pink",
    };
    name.to_string()
}
