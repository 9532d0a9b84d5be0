//! Pure palette rule engine: color math, role rules, ratio allocation,
//! neutral generation, and harmony suggestions.
//!
//! Nothing in this module tree touches shared state or the network. The
//! service layer feeds palettes through these transforms after every
//! mutation and commits the result.

pub mod harmony;
pub mod neutrals;
pub mod ratio;
pub mod role;
pub mod space;

pub use self::role::{ColorRole, RoleRules};

/// A single palette entry, the engine's only domain object.
#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    /// Canonical 6-digit hex value, stored lowercase.
    pub hex: String,
    /// Semantic role within the palette.
    pub role: ColorRole,
    /// Optional display name; suggested from hue when absent.
    pub label: Option<String>,
    /// Target usage share in `[0, 1]`; cosmetic for neutral roles.
    pub ratio: Option<f64>,
    /// Set once a user has manually edited this color's ratio.
    pub is_custom_ratio: bool,
    /// Locked ratios are excluded from automatic redistribution.
    pub is_locked: bool,
    /// True for system-generated neutrals, false for user-added colors.
    pub is_auto: bool,
}

impl Color {
    /// Create a user-added color with no ratio assigned yet.
    pub fn new(hex: impl Into<String>, role: ColorRole) -> Self {
        Self {
            hex: hex.into().to_ascii_lowercase(),
            role,
            label: None,
            ratio: None,
            is_custom_ratio: false,
            is_locked: false,
            is_auto: false,
        }
    }

    /// Whether this color participates in ratio accounting.
    pub fn is_core(&self) -> bool {
        self.role.is_core()
    }

    /// Ratio value, treating an unassigned ratio as zero.
    pub fn ratio_or_zero(&self) -> f64 {
        self.ratio.unwrap_or(0.0)
    }
}
