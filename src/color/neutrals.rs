//! Auto-generation of light/dark neutral colors from a primary color.

use crate::color::space::{Hsl, contrast_ratio, hex_to_hsl, hsl_to_hex};
use crate::color::{Color, ColorRole};

/// Light neutral used when no primary color exists.
const LIGHT_FALLBACK: &str = "#f9f9f9";
/// Dark neutral used when no primary color exists.
const DARK_FALLBACK: &str = "#1a1a1a";
/// Required contrast between a neutral and the primary it derives from.
const PRIMARY_CONTRAST_TARGET: f64 = 3.0;
/// Softer bar applied against the other core colors in the palette.
const SIBLING_CONTRAST_MIN: f64 = 2.5;
/// Default cosmetic ratio; callers override it from the primary's share.
const DEFAULT_NEUTRAL_RATIO: f64 = 0.1;

/// Which way the repair loop moves a candidate's lightness.
#[derive(Debug, Clone, Copy)]
enum Repair {
    /// Light candidates walk their lightness down, floor at 5.
    StepDown,
    /// Dark candidates walk their lightness up, ceiling at 95.
    StepUp,
}

/// Derive a `[light, dark]` neutral pair for the palette.
///
/// Without a primary the fixed fallback pair is returned. With one, the
/// candidates start at `HSL(h, 8, 96)` and `HSL(h, 15, 12)` on the primary's
/// hue, are walked toward the primary-contrast target, and finally checked
/// against every other core color at a softer bar; a candidate that clashes
/// with a sibling is swapped for a more extreme variant without re-running
/// the repair loop.
pub fn generate_neutrals(primary: Option<&Color>, others: &[Color]) -> Vec<Color> {
    let Some(primary) = primary else {
        return vec![
            neutral(LIGHT_FALLBACK.into(), ColorRole::NeutralLight),
            neutral(DARK_FALLBACK.into(), ColorRole::NeutralDark),
        ];
    };

    let hue = hex_to_hsl(&primary.hex).h;

    let light = build_candidate(
        Hsl { h: hue, s: 8.0, l: 96.0 },
        Hsl { h: hue, s: 5.0, l: 98.0 },
        Repair::StepDown,
        primary,
        others,
    );
    let dark = build_candidate(
        Hsl { h: hue, s: 15.0, l: 12.0 },
        Hsl { h: hue, s: 18.0, l: 8.0 },
        Repair::StepUp,
        primary,
        others,
    );

    vec![
        neutral(light, ColorRole::NeutralLight),
        neutral(dark, ColorRole::NeutralDark),
    ]
}

fn build_candidate(
    start: Hsl,
    extreme: Hsl,
    repair: Repair,
    primary: &Color,
    others: &[Color],
) -> String {
    let repaired = ensure_contrast(start, &primary.hex, PRIMARY_CONTRAST_TARGET, repair);

    let clashes = others
        .iter()
        .filter(|c| c.is_core())
        .any(|c| contrast_ratio(&repaired, &c.hex) < SIBLING_CONTRAST_MIN);

    if clashes { hsl_to_hex(extreme) } else { repaired }
}

/// Walk a candidate's lightness by 2 per step until the contrast target is
/// met or the lightness headroom runs out. Bounded by the lightness range,
/// so it always terminates.
fn ensure_contrast(mut candidate: Hsl, against: &str, target: f64, repair: Repair) -> String {
    let mut hex = hsl_to_hex(candidate);
    loop {
        if contrast_ratio(&hex, against) >= target {
            return hex;
        }
        match repair {
            Repair::StepDown => {
                if candidate.l <= 5.0 {
                    return hex;
                }
                candidate.l -= 2.0;
            }
            Repair::StepUp => {
                if candidate.l >= 95.0 {
                    return hex;
                }
                candidate.l += 2.0;
            }
        }
        hex = hsl_to_hex(candidate);
    }
}

fn neutral(hex: String, role: ColorRole) -> Color {
    Color {
        label: Some(
            match role {
                ColorRole::NeutralLight => "Light Neutral",
                _ => "Dark Neutral",
            }
            .into(),
        ),
        ratio: Some(DEFAULT_NEUTRAL_RATIO),
        is_auto: true,
        ..Color::new(hex, role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::space::hex_eq;

    #[test]
    fn fallback_pair_without_primary() {
        let pair = generate_neutrals(None, &[]);
        assert_eq!(pair.len(), 2);
        assert!(hex_eq(&pair[0].hex, "#F9F9F9"));
        assert!(hex_eq(&pair[1].hex, "#1A1A1A"));
        assert!(pair.iter().all(|c| c.is_auto));
        assert!(pair.iter().all(|c| c.ratio == Some(0.1)));
    }

    #[test]
    fn neutrals_meet_primary_contrast_target() {
        let primary = Color::new("#2196f3", ColorRole::Primary);
        let pair = generate_neutrals(Some(&primary), &[]);
        for candidate in &pair {
            assert!(
                contrast_ratio(&candidate.hex, &primary.hex) >= 3.0,
                "{} vs primary: {}",
                candidate.hex,
                contrast_ratio(&candidate.hex, &primary.hex)
            );
        }
    }

    #[test]
    fn dark_primary_keeps_light_candidate_light() {
        // A dark primary already clears the target at the starting lightness.
        let primary = Color::new("#1b2a4a", ColorRole::Primary);
        let pair = generate_neutrals(Some(&primary), &[]);
        let light = hex_to_hsl(&pair[0].hex);
        assert!(light.l >= 90.0, "light neutral degraded to l={}", light.l);
    }

    #[test]
    fn sibling_clash_swaps_in_extreme_variant() {
        let primary = Color::new("#2196f3", ColorRole::Primary);
        // A near-black accent clashes with the dark candidate.
        let accent = Color::new("#111111", ColorRole::Accent);
        let pair = generate_neutrals(Some(&primary), &[accent]);

        let hue = hex_to_hsl(&primary.hex).h;
        let expected = hsl_to_hex(Hsl { h: hue, s: 18.0, l: 8.0 });
        assert_eq!(pair[1].hex, expected);
    }

    #[test]
    fn neutrals_carry_roles_and_labels() {
        let pair = generate_neutrals(None, &[]);
        assert_eq!(pair[0].role, ColorRole::NeutralLight);
        assert_eq!(pair[1].role, ColorRole::NeutralDark);
        assert_eq!(pair[0].label.as_deref(), Some("Light Neutral"));
        assert_eq!(pair[1].label.as_deref(), Some("Dark Neutral"));
    }
}
