//! Palette editing session state and its mutation rules.
//!
//! The editor owns the ordered color list and the collection-level ratio
//! mode. Every mutation validates its input, applies the change, and then
//! reconciles the list through the pure engine (auto-neutral regeneration
//! followed by ratio allocation or renormalization) before returning.

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::color::{
    Color, ColorRole,
    neutrals::generate_neutrals,
    ratio::{
        NEUTRAL_RATIO_FACTOR, RatioMode, calculate_intelligent_ratios, smart_normalize_ratios,
    },
    role::suggest_label,
    space::hex_eq,
};
use crate::config::AppConfig;

/// Errors produced by palette mutations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    /// Hex value does not parse as a 3- or 6-digit hex color.
    #[error("invalid hex color `{0}`")]
    InvalidHex(String),
    /// Another color of the same role already uses this hex value.
    #[error("color `{hex}` already exists with role {role}")]
    DuplicateInRole {
        /// Offending hex value.
        hex: String,
        /// Role under which the duplicate exists.
        role: ColorRole,
    },
    /// The role already holds its maximum number of colors.
    #[error("role {role} is limited to {cap} color(s)")]
    RoleCapReached {
        /// Role whose cap was hit.
        role: ColorRole,
        /// Configured cap for that role.
        cap: usize,
    },
    /// The palette already holds the maximum number of user colors.
    #[error("palette is limited to {0} colors")]
    MaxColorsReached(usize),
    /// The palette crossed the soft-warning size and the caller did not confirm.
    #[error("palette already has {count} colors; confirm to add more")]
    NeedsConfirmation {
        /// Current user color count.
        count: usize,
    },
    /// The operation would leave the palette empty.
    #[error("operation refused: it would leave the palette without any color")]
    WouldEmptyPalette,
    /// No color exists at the given position.
    #[error("no color at index {0}")]
    IndexOutOfRange(usize),
    /// The operation only applies to core (non-neutral) colors.
    #[error("color at index {0} does not participate in ratio accounting")]
    NotACoreColor(usize),
    /// The color's ratio is locked and cannot be edited directly.
    #[error("color at index {0} is locked")]
    Locked(usize),
}

/// A saved palette snapshot. Persistence beyond process lifetime is
/// delegated to the external pipeline API; this store backs the editor's
/// save/load flow.
#[derive(Debug, Clone)]
pub struct Preset {
    /// Preset identifier.
    pub id: Uuid,
    /// User-facing preset name.
    pub name: String,
    /// Color list at save time.
    pub colors: Vec<Color>,
    /// Ratio mode at save time.
    pub mode: RatioMode,
    /// Auto-neutral flag at save time.
    pub auto_neutrals: bool,
    /// Save timestamp.
    pub created_at: OffsetDateTime,
}

/// Fields accepted by [`PaletteEditor::update_color`]; `None` leaves a field untouched.
#[derive(Debug, Default, Clone)]
pub struct ColorPatch {
    /// Replacement hex value, already validated and normalized.
    pub hex: Option<String>,
    /// Replacement role.
    pub role: Option<ColorRole>,
    /// Replacement label.
    pub label: Option<String>,
}

/// The single logical owner of the color-list state.
#[derive(Debug, Clone)]
pub struct PaletteEditor {
    colors: Vec<Color>,
    mode: RatioMode,
    auto_neutrals: bool,
}

impl Default for PaletteEditor {
    fn default() -> Self {
        Self {
            colors: Vec::new(),
            mode: RatioMode::Auto,
            auto_neutrals: true,
        }
    }
}

impl PaletteEditor {
    /// Create an empty editor in auto mode with auto-neutrals enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current color list, auto-neutrals included.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Collection-level ratio mode.
    pub fn mode(&self) -> RatioMode {
        self.mode
    }

    /// Whether system neutrals are maintained automatically.
    pub fn auto_neutrals(&self) -> bool {
        self.auto_neutrals
    }

    /// Number of user-added (non-auto) colors.
    pub fn user_color_count(&self) -> usize {
        self.colors.iter().filter(|c| !c.is_auto).count()
    }

    /// Add a user color.
    ///
    /// `confirmed` acknowledges the soft size warning; the hard cap can never
    /// be confirmed away. The label falls back to a hue-derived suggestion.
    pub fn add_color(
        &mut self,
        config: &AppConfig,
        hex: String,
        role: ColorRole,
        label: Option<String>,
        confirmed: bool,
    ) -> Result<(), EditError> {
        check_hex(&hex)?;
        self.check_duplicate(&hex, role, None)?;
        self.check_role_cap(config, role, None)?;

        let count = self.user_color_count();
        if count >= config.max_colors() {
            return Err(EditError::MaxColorsReached(config.max_colors()));
        }
        if count >= config.soft_color_warning() && !confirmed {
            return Err(EditError::NeedsConfirmation { count });
        }

        let label = label.or_else(|| Some(suggest_label(&hex)));
        self.colors.push(Color {
            label,
            ..Color::new(hex, role)
        });
        self.reconcile(config);
        Ok(())
    }

    /// Apply a partial edit to the color at `index`.
    pub fn update_color(
        &mut self,
        config: &AppConfig,
        index: usize,
        patch: ColorPatch,
    ) -> Result<(), EditError> {
        let current = self
            .colors
            .get(index)
            .cloned()
            .ok_or(EditError::IndexOutOfRange(index))?;

        let next_hex = patch.hex.clone().unwrap_or_else(|| current.hex.clone());
        let next_role = patch.role.unwrap_or(current.role);

        check_hex(&next_hex)?;
        self.check_duplicate(&next_hex, next_role, Some(index))?;
        if next_role != current.role {
            self.check_role_cap(config, next_role, Some(index))?;
        }

        // A hex change only refreshes hue-derived labels; a manually entered
        // label stays until the client replaces it.
        let label_is_derived =
            current.label.as_deref() == Some(suggest_label(&current.hex).as_str());

        let color = &mut self.colors[index];
        color.hex = next_hex.to_ascii_lowercase();
        color.role = next_role;
        if let Some(label) = patch.label {
            color.label = Some(label);
        } else if patch.hex.is_some() && (label_is_derived || color.label.is_none()) {
            color.label = Some(suggest_label(&color.hex));
        }
        // Editing an auto neutral converts it into a manual one.
        color.is_auto = false;

        self.reconcile(config);
        Ok(())
    }

    /// Remove the color at `index`.
    pub fn remove_color(&mut self, config: &AppConfig, index: usize) -> Result<(), EditError> {
        if index >= self.colors.len() {
            return Err(EditError::IndexOutOfRange(index));
        }
        self.colors.remove(index);
        self.reconcile(config);
        Ok(())
    }

    /// Set the ratio of the core color at `index`.
    ///
    /// A live drag (`commit == false`) updates only this color so the control
    /// does not flicker; the drag-end commit renormalizes the rest of the
    /// palette around it. Either way the collection flips to manual mode.
    pub fn set_ratio(
        &mut self,
        index: usize,
        ratio: f64,
        commit: bool,
    ) -> Result<(), EditError> {
        let color = self
            .colors
            .get_mut(index)
            .ok_or(EditError::IndexOutOfRange(index))?;
        if !color.is_core() {
            return Err(EditError::NotACoreColor(index));
        }
        if color.is_locked {
            return Err(EditError::Locked(index));
        }

        color.ratio = Some(ratio.clamp(0.0, 1.0));
        color.is_custom_ratio = true;
        self.mode = RatioMode::Manual;

        if commit {
            smart_normalize_ratios(&mut self.colors, Some(index));
        }
        Ok(())
    }

    /// Toggle the redistribution lock on the core color at `index`.
    ///
    /// Locking under auto mode freezes the currently computed ratio, so the
    /// collection becomes manually managed from that point on.
    pub fn set_locked(&mut self, index: usize, locked: bool) -> Result<(), EditError> {
        let color = self
            .colors
            .get_mut(index)
            .ok_or(EditError::IndexOutOfRange(index))?;
        if !color.is_core() {
            return Err(EditError::NotACoreColor(index));
        }

        color.is_locked = locked;
        if locked {
            self.mode = RatioMode::Manual;
        }
        smart_normalize_ratios(&mut self.colors, None);
        Ok(())
    }

    /// Return the collection to auto mode: locks cleared, ratios recomputed
    /// from the role split.
    pub fn reset_ratios(&mut self, config: &AppConfig) {
        for color in &mut self.colors {
            color.is_locked = false;
            color.is_custom_ratio = false;
        }
        self.mode = RatioMode::Auto;
        calculate_intelligent_ratios(&mut self.colors, config.role_rules());
    }

    /// Enable or disable automatic neutral maintenance.
    ///
    /// Disabling removes the system-generated neutrals and is refused when
    /// that would leave the palette empty.
    pub fn set_auto_neutrals(
        &mut self,
        config: &AppConfig,
        enabled: bool,
    ) -> Result<(), EditError> {
        if !enabled && self.user_color_count() == 0 && !self.colors.is_empty() {
            return Err(EditError::WouldEmptyPalette);
        }
        self.auto_neutrals = enabled;
        self.reconcile(config);
        Ok(())
    }

    /// Capture the current state as a named preset.
    pub fn save_preset(&self, name: String) -> Preset {
        Preset {
            id: Uuid::new_v4(),
            name,
            colors: self.colors.clone(),
            mode: self.mode,
            auto_neutrals: self.auto_neutrals,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Replace the editor state with a saved preset.
    pub fn load_preset(&mut self, config: &AppConfig, preset: &Preset) {
        self.colors = preset.colors.clone();
        self.mode = preset.mode;
        self.auto_neutrals = preset.auto_neutrals;
        self.reconcile(config);
    }

    fn check_duplicate(
        &self,
        hex: &str,
        role: ColorRole,
        skip: Option<usize>,
    ) -> Result<(), EditError> {
        let duplicate = self.colors.iter().enumerate().any(|(i, c)| {
            Some(i) != skip && c.role == role && hex_eq(&c.hex, hex)
        });
        if duplicate {
            return Err(EditError::DuplicateInRole {
                hex: hex.to_string(),
                role,
            });
        }
        Ok(())
    }

    fn check_role_cap(
        &self,
        config: &AppConfig,
        role: ColorRole,
        skip: Option<usize>,
    ) -> Result<(), EditError> {
        let cap = config.role_rules().max_count(role);
        let in_role = self
            .colors
            .iter()
            .enumerate()
            .filter(|(i, c)| Some(*i) != skip && c.role == role && !c.is_auto)
            .count();
        if in_role >= cap {
            return Err(EditError::RoleCapReached { role, cap });
        }
        Ok(())
    }

    /// Rebuild auto neutrals and re-run the ratio engine after a mutation.
    fn reconcile(&mut self, config: &AppConfig) {
        self.reconcile_neutrals(config);
        match self.mode {
            RatioMode::Auto => {
                calculate_intelligent_ratios(&mut self.colors, config.role_rules());
            }
            RatioMode::Manual => smart_normalize_ratios(&mut self.colors, None),
        }
    }

    fn reconcile_neutrals(&mut self, config: &AppConfig) {
        self.colors.retain(|c| !c.is_auto);

        // A manually added neutral anywhere disables auto-generation.
        let manual_neutral = self.colors.iter().any(|c| !c.is_core());
        if manual_neutral || !self.auto_neutrals || self.colors.is_empty() {
            return;
        }

        let primary = self
            .colors
            .iter()
            .find(|c| c.role == ColorRole::Primary)
            .cloned();
        let siblings: Vec<Color> = self
            .colors
            .iter()
            .filter(|c| c.is_core() && primary.as_ref().is_none_or(|p| !hex_eq(&c.hex, &p.hex)))
            .cloned()
            .collect();

        let mut generated = generate_neutrals(primary.as_ref(), &siblings);
        if let Some(ratio) = primary.as_ref().and_then(|p| p.ratio) {
            for neutral in &mut generated {
                neutral.ratio = Some(ratio * NEUTRAL_RATIO_FACTOR);
            }
        }

        // Auto neutrals may only use the two slots beyond the user cap.
        let budget = (config.max_colors() + 2).saturating_sub(self.colors.len());
        generated.truncate(budget);
        self.colors.extend(generated);
    }
}

/// The editor only stores canonical 6-digit hex; shorthand expansion happens
/// at the DTO boundary.
fn check_hex(hex: &str) -> Result<(), EditError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EditError::InvalidHex(hex.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::space::contrast_ratio;

    fn config() -> AppConfig {
        AppConfig::default()
    }

    fn add(editor: &mut PaletteEditor, hex: &str, role: ColorRole) {
        editor
            .add_color(&config(), hex.into(), role, None, true)
            .unwrap();
    }

    fn core_sum(editor: &PaletteEditor) -> f64 {
        editor
            .colors()
            .iter()
            .filter(|c| c.is_core())
            .map(Color::ratio_or_zero)
            .sum()
    }

    #[test]
    fn adding_a_primary_creates_auto_neutrals() {
        let mut editor = PaletteEditor::new();
        add(&mut editor, "#2196f3", ColorRole::Primary);

        assert_eq!(editor.user_color_count(), 1);
        let autos: Vec<_> = editor.colors().iter().filter(|c| c.is_auto).collect();
        assert_eq!(autos.len(), 2);
        for neutral in autos {
            assert!(contrast_ratio(&neutral.hex, "#2196f3") >= 3.0);
        }
        // Single core color takes the full budget.
        assert_eq!(editor.colors()[0].ratio, Some(1.0));
    }

    #[test]
    fn malformed_hex_is_rejected() {
        let mut editor = PaletteEditor::new();
        let err = editor
            .add_color(&config(), "#12g4".into(), ColorRole::Primary, None, true)
            .unwrap_err();
        assert!(matches!(err, EditError::InvalidHex(_)));
    }

    #[test]
    fn hex_edit_refreshes_derived_labels_but_keeps_manual_ones() {
        let mut editor = PaletteEditor::new();
        add(&mut editor, "#2196f3", ColorRole::Primary);
        assert_eq!(editor.colors()[0].label.as_deref(), Some("Blue"));

        let patch = |hex: &str| ColorPatch {
            hex: Some(hex.into()),
            ..ColorPatch::default()
        };

        editor.update_color(&config(), 0, patch("#ff0000")).unwrap();
        assert_eq!(editor.colors()[0].label.as_deref(), Some("Red"));

        editor
            .update_color(
                &config(),
                0,
                ColorPatch {
                    label: Some("Brand red".into()),
                    ..ColorPatch::default()
                },
            )
            .unwrap();
        editor.update_color(&config(), 0, patch("#00aa00")).unwrap();
        assert_eq!(editor.colors()[0].label.as_deref(), Some("Brand red"));
    }

    #[test]
    fn auto_neutral_ratios_track_the_primary_share() {
        let mut editor = PaletteEditor::new();
        add(&mut editor, "#2196f3", ColorRole::Primary);
        add(&mut editor, "#ff5722", ColorRole::Accent);

        let primary_ratio = editor.colors()[0].ratio.unwrap();
        let autos: Vec<_> = editor.colors().iter().filter(|c| c.is_auto).collect();
        assert_eq!(autos.len(), 2);
        for neutral in autos {
            let expected = primary_ratio * NEUTRAL_RATIO_FACTOR;
            assert!((neutral.ratio.unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn duplicate_hex_is_scoped_per_role() {
        let mut editor = PaletteEditor::new();
        add(&mut editor, "#ff0000", ColorRole::Accent);

        let err = editor
            .add_color(&config(), "#FF0000".into(), ColorRole::Accent, None, true)
            .unwrap_err();
        assert!(matches!(err, EditError::DuplicateInRole { .. }));

        // Same hex under a different role is allowed.
        editor
            .add_color(&config(), "#FF0000".into(), ColorRole::Primary, None, true)
            .unwrap();
    }

    #[test]
    fn role_cap_refuses_a_third_primary() {
        let mut editor = PaletteEditor::new();
        add(&mut editor, "#111111", ColorRole::Primary);
        add(&mut editor, "#222222", ColorRole::Primary);

        let err = editor
            .add_color(&config(), "#333333".into(), ColorRole::Primary, None, true)
            .unwrap_err();
        assert_eq!(
            err,
            EditError::RoleCapReached {
                role: ColorRole::Primary,
                cap: 2
            }
        );
    }

    #[test]
    fn soft_warning_requires_confirmation_but_hard_cap_does_not_yield() {
        let mut editor = PaletteEditor::new();
        let cfg = config();
        let colors = [
            ("#111111", ColorRole::Primary),
            ("#222222", ColorRole::Primary),
            ("#333333", ColorRole::Secondary),
            ("#444444", ColorRole::Secondary),
            ("#555555", ColorRole::Secondary),
        ];
        for (hex, role) in colors {
            editor
                .add_color(&cfg, hex.into(), role, None, false)
                .unwrap();
        }

        // Sixth color crosses the soft threshold of 5.
        let err = editor
            .add_color(&cfg, "#666666".into(), ColorRole::Accent, None, false)
            .unwrap_err();
        assert!(matches!(err, EditError::NeedsConfirmation { count: 5 }));

        editor
            .add_color(&cfg, "#666666".into(), ColorRole::Accent, None, true)
            .unwrap();
        assert_eq!(editor.user_color_count(), 6);
    }

    #[test]
    fn mode_flips_to_manual_on_ratio_edit_and_back_on_reset() {
        let mut editor = PaletteEditor::new();
        add(&mut editor, "#111111", ColorRole::Primary);
        add(&mut editor, "#222222", ColorRole::Secondary);
        assert_eq!(editor.mode(), RatioMode::Auto);

        editor.set_ratio(0, 0.5, true).unwrap();
        assert_eq!(editor.mode(), RatioMode::Manual);
        assert!(editor.colors()[0].is_custom_ratio);

        editor.reset_ratios(&config());
        assert_eq!(editor.mode(), RatioMode::Auto);
        assert!(!editor.colors()[0].is_custom_ratio);
        assert!((editor.colors()[0].ratio.unwrap() - 0.65).abs() < 1e-9);
    }

    #[test]
    fn drag_commit_renormalizes_around_the_edited_color() {
        let mut editor = PaletteEditor::new();
        add(&mut editor, "#111111", ColorRole::Primary);
        add(&mut editor, "#222222", ColorRole::Secondary);
        add(&mut editor, "#333333", ColorRole::Accent);

        editor.set_ratio(0, 0.5, false).unwrap();
        editor.set_locked(0, true).unwrap();
        editor.set_ratio(1, 0.3, true).unwrap();

        assert_eq!(editor.colors()[0].ratio, Some(0.5));
        assert_eq!(editor.colors()[1].ratio, Some(0.3));
        assert!((core_sum(&editor) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn locked_ratio_cannot_be_edited() {
        let mut editor = PaletteEditor::new();
        add(&mut editor, "#111111", ColorRole::Primary);
        add(&mut editor, "#222222", ColorRole::Secondary);
        editor.set_locked(0, true).unwrap();

        assert_eq!(editor.set_ratio(0, 0.9, true).unwrap_err(), EditError::Locked(0));
    }

    #[test]
    fn manual_neutral_disables_auto_generation() {
        let mut editor = PaletteEditor::new();
        add(&mut editor, "#2196f3", ColorRole::Primary);
        assert!(editor.colors().iter().any(|c| c.is_auto));

        add(&mut editor, "#fafafa", ColorRole::NeutralLight);
        assert!(!editor.colors().iter().any(|c| c.is_auto));
        assert_eq!(editor.colors().len(), 2);
    }

    #[test]
    fn disabling_auto_neutrals_never_empties_the_palette() {
        let mut editor = PaletteEditor::new();
        add(&mut editor, "#2196f3", ColorRole::Primary);
        editor.remove_color(&config(), 0).unwrap();
        // Only auto neutrals could remain; with no user colors they are gone
        // too, so the palette is already empty and the toggle is a no-op.
        assert!(editor.colors().is_empty());
        editor.set_auto_neutrals(&config(), false).unwrap();

        let mut editor = PaletteEditor::new();
        add(&mut editor, "#2196f3", ColorRole::Primary);
        editor.set_auto_neutrals(&config(), false).unwrap();
        assert_eq!(editor.colors().len(), 1);
    }

    #[test]
    fn presets_round_trip_the_editor_state() {
        let mut editor = PaletteEditor::new();
        add(&mut editor, "#111111", ColorRole::Primary);
        add(&mut editor, "#222222", ColorRole::Secondary);
        editor.set_ratio(0, 0.7, true).unwrap();

        let preset = editor.save_preset("Brand kit".into());

        let mut restored = PaletteEditor::new();
        restored.load_preset(&config(), &preset);
        assert_eq!(restored.mode(), RatioMode::Manual);
        assert_eq!(restored.colors()[0].ratio, editor.colors()[0].ratio);
    }

    #[test]
    fn removing_the_primary_refreshes_neutrals() {
        let mut editor = PaletteEditor::new();
        add(&mut editor, "#2196f3", ColorRole::Primary);
        add(&mut editor, "#ff5722", ColorRole::Accent);
        let before: Vec<String> = editor
            .colors()
            .iter()
            .filter(|c| c.is_auto)
            .map(|c| c.hex.clone())
            .collect();

        editor.remove_color(&config(), 0).unwrap();
        let after: Vec<String> = editor
            .colors()
            .iter()
            .filter(|c| c.is_auto)
            .map(|c| c.hex.clone())
            .collect();
        assert_eq!(after.len(), 2);
        assert_ne!(before, after);
    }
}
