//! Usage-ratio allocation and normalization for core palette colors.
//!
//! Core (non-neutral) colors share a usage budget that must settle close to
//! 1.0 after every mutation. Auto mode derives ratios from the 60/30/10 role
//! split; manual mode renormalizes user-set ratios around locks.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::color::{Color, ColorRole, RoleRules};

/// Tolerated band around 1.0 before renormalization kicks in.
const SUM_TOLERANCE: f64 = 0.05;
/// Slack left for unlocked colors when locked ratios are scaled down.
const LOCKED_SHRINK_TARGET: f64 = 0.98;
/// Share of the primary ratio mirrored onto cosmetic neutral ratios.
pub const NEUTRAL_RATIO_FACTOR: f64 = 0.2;

/// Whether the core color set is system-managed or user-managed.
///
/// The mode lives on the collection, not on individual colors: a single
/// manual ratio edit converts the entire core set to manual management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RatioMode {
    /// All core ratios are derived from the role split.
    Auto,
    /// At least one core ratio was set by the user.
    Manual,
}

/// Assign role-based ratios to every core color (auto mode).
///
/// Each role present in the palette contributes its base ratio; when the
/// bases of the present roles sum below 1, the shortfall is split evenly
/// across those roles (additive) before dividing a role's share evenly among
/// its member colors. Neutrals are skipped except for their cosmetic ratio,
/// which tracks 20% of a primary color's share.
///
/// A palette whose only core role is accent therefore ends up with the
/// accent at 100%; the redistribution rule is applied as-is.
pub fn calculate_intelligent_ratios(colors: &mut [Color], rules: &RoleRules) {
    let core_count = colors.iter().filter(|c| c.is_core()).count();
    if core_count == 0 {
        return;
    }

    if core_count == 1 {
        for color in colors.iter_mut().filter(|c| c.is_core()) {
            color.ratio = Some(1.0);
            color.is_custom_ratio = false;
        }
        sync_neutral_ratios(colors);
        return;
    }

    let present_roles: Vec<ColorRole> = ColorRole::ALL
        .into_iter()
        .filter(|&role| role.is_core() && colors.iter().any(|c| c.role == role))
        .collect();

    let base_sum: f64 = present_roles.iter().map(|&r| rules.base_ratio(r)).sum();
    let bonus = if base_sum < 1.0 {
        (1.0 - base_sum) / present_roles.len() as f64
    } else {
        0.0
    };

    for &role in &present_roles {
        let members = colors
            .iter()
            .filter(|c| c.is_core() && c.role == role)
            .count();
        let per_color = (rules.base_ratio(role) + bonus) / members as f64;
        for color in colors.iter_mut().filter(|c| c.role == role) {
            color.ratio = Some(per_color);
            color.is_custom_ratio = false;
        }
    }

    sync_neutral_ratios(colors);
}

/// Renormalize manually managed ratios so core colors sum close to 1.
///
/// Locked ratios are held fixed unless they alone reach the full budget, in
/// which case they are proportionally shrunk to leave 2% of slack. When
/// `active_index` names an unlocked core color, that color is treated as the
/// user's just-edited one: its ratio is held and only the remaining unlocked
/// colors absorb the correction. Degenerate cases (nothing to scale, no
/// space left) are skipped silently; ratios then stay as last set.
///
/// This function never touches `is_custom_ratio`; callers decide the mode.
pub fn smart_normalize_ratios(colors: &mut [Color], active_index: Option<usize>) {
    let total: f64 = colors
        .iter()
        .filter(|c| c.is_core())
        .map(Color::ratio_or_zero)
        .sum();
    if (1.0 - SUM_TOLERANCE..=1.0 + SUM_TOLERANCE).contains(&total) {
        return;
    }
    if colors.iter().filter(|c| c.is_core()).count() == 0 {
        return;
    }

    let locked_sum: f64 = colors
        .iter()
        .filter(|c| c.is_core() && c.is_locked)
        .map(Color::ratio_or_zero)
        .sum();

    if locked_sum >= 1.0 {
        // Locks alone exhaust the budget: shrink them uniformly and leave
        // the unlocked colors untouched.
        let factor = LOCKED_SHRINK_TARGET / locked_sum;
        for color in colors.iter_mut().filter(|c| c.is_core() && c.is_locked) {
            color.ratio = Some(color.ratio_or_zero() * factor);
        }
        return;
    }

    let available = 1.0 - locked_sum;

    let active = active_index.filter(|&i| {
        colors
            .get(i)
            .is_some_and(|c| c.is_core() && !c.is_locked)
    });

    if let Some(active_idx) = active {
        let active_ratio = colors[active_idx].ratio_or_zero();
        let remaining = available - active_ratio;
        let other_total: f64 = colors
            .iter()
            .enumerate()
            .filter(|(i, c)| *i != active_idx && c.is_core() && !c.is_locked)
            .map(|(_, c)| c.ratio_or_zero())
            .sum();

        if other_total <= 0.0 || remaining <= 0.0 {
            return;
        }

        let factor = remaining / other_total;
        for (i, color) in colors.iter_mut().enumerate() {
            if i != active_idx && color.is_core() && !color.is_locked {
                color.ratio = Some(color.ratio_or_zero() * factor);
            }
        }
    } else {
        let unlocked_total: f64 = colors
            .iter()
            .filter(|c| c.is_core() && !c.is_locked)
            .map(Color::ratio_or_zero)
            .sum();
        if unlocked_total <= 0.0 {
            return;
        }

        let factor = available / unlocked_total;
        for color in colors.iter_mut().filter(|c| c.is_core() && !c.is_locked) {
            color.ratio = Some(color.ratio_or_zero() * factor);
        }
    }
}

/// Interaction bounds for a single color's ratio control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderConstraints {
    /// Lower bound, always zero.
    pub min: f64,
    /// Upper bound given the other colors' locks.
    pub max: f64,
    /// Whether the control should be non-interactive.
    pub disabled: bool,
}

/// Compute the ratio-slider bounds for the color at `index`.
///
/// A locked color is frozen at its own ratio. An unlocked color may grow
/// into whatever the other locked colors leave free. The control is disabled
/// when the color is locked, when the other locks leave effectively no room
/// (0.99 or more taken), or when it is the sole unlocked core color while
/// others are locked. In that last case its value is implied by the locks
/// and editing it would immediately be undone.
pub fn slider_constraints(colors: &[Color], index: usize) -> SliderConstraints {
    let Some(color) = colors.get(index) else {
        return SliderConstraints { min: 0.0, max: 0.0, disabled: true };
    };
    if !color.is_core() {
        return SliderConstraints { min: 0.0, max: 0.0, disabled: true };
    }

    let other_locked_sum: f64 = colors
        .iter()
        .enumerate()
        .filter(|(i, c)| *i != index && c.is_core() && c.is_locked)
        .map(|(_, c)| c.ratio_or_zero())
        .sum();
    let other_locked_count = colors
        .iter()
        .enumerate()
        .filter(|(i, c)| *i != index && c.is_core() && c.is_locked)
        .count();
    let unlocked_core = colors
        .iter()
        .filter(|c| c.is_core() && !c.is_locked)
        .count();

    let max = if color.is_locked {
        color.ratio_or_zero()
    } else {
        (1.0 - other_locked_sum).max(0.0)
    };

    let auto_locked_last = !color.is_locked && unlocked_core == 1 && other_locked_count >= 1;
    let disabled = color.is_locked || other_locked_sum >= 0.99 || auto_locked_last;

    SliderConstraints { min: 0.0, max, disabled }
}

/// Mirror 20% of a primary color's ratio onto the cosmetic neutral ratios.
fn sync_neutral_ratios(colors: &mut [Color]) {
    let primary_ratio = colors
        .iter()
        .find(|c| c.role == ColorRole::Primary)
        .and_then(|c| c.ratio);
    let Some(primary_ratio) = primary_ratio else {
        return;
    };

    for color in colors.iter_mut().filter(|c| !c.is_core()) {
        color.ratio = Some(primary_ratio * NEUTRAL_RATIO_FACTOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(hex: &str, role: ColorRole, ratio: f64) -> Color {
        Color {
            ratio: Some(ratio),
            ..Color::new(hex, role)
        }
    }

    fn locked(hex: &str, role: ColorRole, ratio: f64) -> Color {
        Color {
            is_locked: true,
            ..core(hex, role, ratio)
        }
    }

    fn core_sum(colors: &[Color]) -> f64 {
        colors
            .iter()
            .filter(|c| c.is_core())
            .map(Color::ratio_or_zero)
            .sum()
    }

    #[test]
    fn single_core_color_gets_full_ratio() {
        let mut colors = vec![Color::new("#2196f3", ColorRole::Primary)];
        calculate_intelligent_ratios(&mut colors, &RoleRules::default());
        assert_eq!(colors[0].ratio, Some(1.0));
        assert!(!colors[0].is_custom_ratio);
    }

    #[test]
    fn full_role_set_yields_60_30_10() {
        let mut colors = vec![
            Color::new("#111111", ColorRole::Primary),
            Color::new("#222222", ColorRole::Secondary),
            Color::new("#333333", ColorRole::Accent),
        ];
        calculate_intelligent_ratios(&mut colors, &RoleRules::default());
        assert!((colors[0].ratio.unwrap() - 0.6).abs() < 0.001);
        assert!((colors[1].ratio.unwrap() - 0.3).abs() < 0.001);
        assert!((colors[2].ratio.unwrap() - 0.1).abs() < 0.001);
    }

    #[test]
    fn missing_role_shortfall_is_split_evenly() {
        let mut colors = vec![
            Color::new("#111111", ColorRole::Primary),
            Color::new("#333333", ColorRole::Accent),
        ];
        calculate_intelligent_ratios(&mut colors, &RoleRules::default());
        // Base sum 0.7; the missing 0.3 is split additively across both roles.
        assert!((colors[0].ratio.unwrap() - 0.75).abs() < 1e-9);
        assert!((colors[1].ratio.unwrap() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn accent_only_palette_takes_the_whole_budget() {
        let mut colors = vec![Color::new("#333333", ColorRole::Accent)];
        calculate_intelligent_ratios(&mut colors, &RoleRules::default());
        assert_eq!(colors[0].ratio, Some(1.0));

        let mut pair = vec![
            Color::new("#333333", ColorRole::Accent),
            Color::new("#444444", ColorRole::Accent),
        ];
        calculate_intelligent_ratios(&mut pair, &RoleRules::default());
        assert!((pair[0].ratio.unwrap() - 0.5).abs() < 1e-9);
        assert!((pair[1].ratio.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn role_share_is_split_among_members() {
        let mut colors = vec![
            Color::new("#111111", ColorRole::Primary),
            Color::new("#1a1a2a", ColorRole::Primary),
            Color::new("#222222", ColorRole::Secondary),
            Color::new("#333333", ColorRole::Accent),
        ];
        calculate_intelligent_ratios(&mut colors, &RoleRules::default());
        assert!((colors[0].ratio.unwrap() - 0.3).abs() < 1e-9);
        assert!((colors[1].ratio.unwrap() - 0.3).abs() < 1e-9);
        assert!((core_sum(&colors) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn neutral_ratio_tracks_primary() {
        let mut colors = vec![
            Color::new("#2196f3", ColorRole::Primary),
            Color::new("#222222", ColorRole::Secondary),
            Color::new("#f9f9f9", ColorRole::NeutralLight),
        ];
        calculate_intelligent_ratios(&mut colors, &RoleRules::default());
        let primary = colors[0].ratio.unwrap();
        assert!((colors[2].ratio.unwrap() - primary * 0.2).abs() < 1e-9);
        // Neutrals never count toward the core sum.
        assert!((core_sum(&colors) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn normalize_is_noop_inside_tolerance_band() {
        let mut colors = vec![
            core("#111111", ColorRole::Primary, 0.62),
            core("#222222", ColorRole::Secondary, 0.41),
        ];
        smart_normalize_ratios(&mut colors, None);
        assert_eq!(colors[0].ratio, Some(0.62));
        assert_eq!(colors[1].ratio, Some(0.41));
    }

    #[test]
    fn normalize_rescales_unlocked_colors_to_unit_sum() {
        let mut colors = vec![
            core("#111111", ColorRole::Primary, 0.9),
            core("#222222", ColorRole::Secondary, 0.6),
            core("#333333", ColorRole::Accent, 0.3),
        ];
        smart_normalize_ratios(&mut colors, None);
        assert!((core_sum(&colors) - 1.0).abs() < 1e-9);
        // Proportions are preserved.
        assert!((colors[0].ratio.unwrap() / colors[2].ratio.unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn locked_ratios_survive_normalization() {
        let mut colors = vec![
            locked("#111111", ColorRole::Primary, 0.5),
            core("#222222", ColorRole::Secondary, 0.6),
            core("#333333", ColorRole::Accent, 0.4),
        ];
        smart_normalize_ratios(&mut colors, None);
        assert_eq!(colors[0].ratio, Some(0.5));
        assert!((core_sum(&colors) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn saturated_locks_are_shrunk_leaving_slack() {
        let mut colors = vec![
            locked("#111111", ColorRole::Primary, 0.8),
            locked("#222222", ColorRole::Secondary, 0.6),
            core("#333333", ColorRole::Accent, 0.2),
        ];
        smart_normalize_ratios(&mut colors, None);
        let locked_sum = colors[0].ratio.unwrap() + colors[1].ratio.unwrap();
        assert!((locked_sum - 0.98).abs() < 1e-9);
        // The unlocked color is untouched in this branch.
        assert_eq!(colors[2].ratio, Some(0.2));
    }

    #[test]
    fn active_color_is_held_during_redistribution() {
        // Lock the first at 0.5, drag the second to 0.3, commit.
        let mut colors = vec![
            locked("#111111", ColorRole::Primary, 0.5),
            core("#222222", ColorRole::Secondary, 0.3),
            core("#333333", ColorRole::Accent, 0.333),
        ];
        smart_normalize_ratios(&mut colors, Some(1));
        assert_eq!(colors[0].ratio, Some(0.5));
        assert_eq!(colors[1].ratio, Some(0.3));
        assert!((colors[2].ratio.unwrap() - 0.2).abs() < 1e-9);
        assert!((core_sum(&colors) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_redistribution_is_skipped() {
        // Active color already fills the available space; others sit at zero.
        let mut colors = vec![
            core("#111111", ColorRole::Primary, 1.2),
            core("#222222", ColorRole::Secondary, 0.0),
        ];
        smart_normalize_ratios(&mut colors, Some(0));
        assert_eq!(colors[0].ratio, Some(1.2));
        assert_eq!(colors[1].ratio, Some(0.0));
    }

    #[test]
    fn active_index_on_locked_color_falls_back_to_plain_redistribution() {
        let mut colors = vec![
            locked("#111111", ColorRole::Primary, 0.4),
            core("#222222", ColorRole::Secondary, 0.9),
        ];
        smart_normalize_ratios(&mut colors, Some(0));
        assert_eq!(colors[0].ratio, Some(0.4));
        assert!((colors[1].ratio.unwrap() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn slider_max_respects_other_locks() {
        let colors = vec![
            locked("#111111", ColorRole::Primary, 0.5),
            core("#222222", ColorRole::Secondary, 0.3),
            core("#333333", ColorRole::Accent, 0.2),
        ];
        let constraints = slider_constraints(&colors, 1);
        assert!((constraints.max - 0.5).abs() < 1e-9);
        assert!(!constraints.disabled);
    }

    #[test]
    fn locked_slider_is_frozen_at_own_ratio() {
        let colors = vec![
            locked("#111111", ColorRole::Primary, 0.5),
            core("#222222", ColorRole::Secondary, 0.5),
        ];
        let constraints = slider_constraints(&colors, 0);
        assert!((constraints.max - 0.5).abs() < 1e-9);
        assert!(constraints.disabled);
    }

    #[test]
    fn last_unlocked_color_is_implicitly_pinned() {
        let colors = vec![
            locked("#111111", ColorRole::Primary, 0.6),
            core("#222222", ColorRole::Secondary, 0.4),
        ];
        let constraints = slider_constraints(&colors, 1);
        assert!(constraints.disabled);
        assert!((constraints.max - 0.4).abs() < 1e-9);
    }

    #[test]
    fn near_full_locks_disable_remaining_sliders() {
        let colors = vec![
            locked("#111111", ColorRole::Primary, 0.6),
            locked("#222222", ColorRole::Secondary, 0.39),
            core("#333333", ColorRole::Accent, 0.01),
            core("#444444", ColorRole::Accent, 0.0),
        ];
        let constraints = slider_constraints(&colors, 2);
        assert!(constraints.disabled);
    }

    #[test]
    fn neutral_slider_is_always_disabled() {
        let colors = vec![
            core("#111111", ColorRole::Primary, 1.0),
            Color::new("#f9f9f9", ColorRole::NeutralLight),
        ];
        assert!(slider_constraints(&colors, 1).disabled);
        assert!(slider_constraints(&colors, 99).disabled);
    }
}
