//! Hue-rotation harmony candidates and the similarity filter used to keep
//! suggestions visually distinct from the existing palette.

use crate::color::space::{Rgb, hex_to_hsl, hex_to_rgb, hsl_to_hex};
use crate::color::{Color, ColorRole};

/// Default hue offset for analogous candidates.
pub const DEFAULT_ANALOGOUS_OFFSET: f64 = 30.0;
/// RGB-distance threshold below which two colors count as similar.
pub const SIMILARITY_THRESHOLD: f64 = 30.0;
/// Relaxed threshold tried when the strict filter removes too much.
const RELAXED_THRESHOLD: f64 = 15.0;
/// Minimum number of suggestions to deliver when the source offers enough.
const MIN_SUGGESTIONS: usize = 2;

/// A candidate color offered for one-click addition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Candidate hex value.
    pub hex: String,
    /// Short description of how the candidate was derived.
    pub label: String,
}

impl Suggestion {
    fn new(hex: String, label: &str) -> Self {
        Self { hex, label: label.to_string() }
    }
}

fn rotate(base: &str, degrees: f64) -> String {
    let mut hsl = hex_to_hsl(base);
    hsl.h += degrees;
    hsl_to_hex(hsl)
}

/// Complementary candidate: hue rotated by 180 degrees.
pub fn complementary(base: &str) -> Suggestion {
    Suggestion::new(rotate(base, 180.0), "Complementary")
}

/// Analogous pair: hue rotated by ±`offset` degrees.
pub fn analogous(base: &str, offset: f64) -> Vec<Suggestion> {
    vec![
        Suggestion::new(rotate(base, offset), "Analogous"),
        Suggestion::new(rotate(base, -offset), "Analogous Alt"),
    ]
}

/// Triadic candidate: hue rotated by 120 degrees.
pub fn triadic(base: &str) -> Suggestion {
    Suggestion::new(rotate(base, 120.0), "Triadic")
}

/// Split-complementary candidate: hue rotated by 210 degrees with slightly
/// reduced saturation.
pub fn split_complementary(base: &str) -> Suggestion {
    let mut hsl = hex_to_hsl(base);
    hsl.h += 210.0;
    hsl.s *= 0.85;
    Suggestion::new(hsl_to_hex(hsl), "Split Complementary")
}

/// Neutral variant of the base color for a neutral target role: saturation
/// scaled far down, lightness pushed toward the matching extreme.
pub fn neutral_variant(base: &str, role: ColorRole) -> Suggestion {
    let mut hsl = hex_to_hsl(base);
    match role {
        ColorRole::NeutralLight => {
            hsl.s *= 0.2;
            hsl.l = 95.0;
        }
        _ => {
            hsl.s *= 0.3;
            hsl.l = 12.0;
        }
    }
    let label = if role == ColorRole::NeutralLight {
        "Light Neutral"
    } else {
        "Dark Neutral"
    };
    Suggestion::new(hsl_to_hex(hsl), label)
}

/// Full candidate set for a target role, derived from a base color.
pub fn suggestions_for(base: &str, target_role: ColorRole, offset: f64) -> Vec<Suggestion> {
    match target_role {
        ColorRole::NeutralLight | ColorRole::NeutralDark => {
            vec![neutral_variant(base, target_role)]
        }
        _ => {
            let mut candidates = vec![complementary(base)];
            candidates.extend(analogous(base, offset));
            candidates.push(triadic(base));
            candidates.push(split_complementary(base));
            candidates
        }
    }
}

/// Euclidean RGB distance check used to drop near-duplicate suggestions.
pub fn are_colors_similar(a: &str, b: &str, threshold: f64) -> bool {
    let Rgb { r: r1, g: g1, b: b1 } = hex_to_rgb(a);
    let Rgb { r: r2, g: g2, b: b2 } = hex_to_rgb(b);
    let dr = f64::from(r1) - f64::from(r2);
    let dg = f64::from(g1) - f64::from(g2);
    let db = f64::from(b1) - f64::from(b2);
    (dr * dr + dg * dg + db * db).sqrt() < threshold
}

/// Drop candidates too close to the existing palette, relaxing the threshold
/// when that would leave fewer than two suggestions.
///
/// Relaxation order: strict threshold, half threshold, then the first
/// candidates unfiltered. The guarantee only applies when the source offered
/// at least two candidates to begin with.
pub fn filter_similar(candidates: Vec<Suggestion>, existing: &[Color]) -> Vec<Suggestion> {
    let keep_with = |threshold: f64| -> Vec<Suggestion> {
        candidates
            .iter()
            .filter(|candidate| {
                !existing
                    .iter()
                    .any(|color| are_colors_similar(&candidate.hex, &color.hex, threshold))
            })
            .cloned()
            .collect()
    };

    let strict = keep_with(SIMILARITY_THRESHOLD);
    if strict.len() >= MIN_SUGGESTIONS || candidates.len() < MIN_SUGGESTIONS {
        return strict;
    }

    let relaxed = keep_with(RELAXED_THRESHOLD);
    if relaxed.len() >= MIN_SUGGESTIONS {
        return relaxed;
    }

    candidates.into_iter().take(MIN_SUGGESTIONS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complementary_of_red_is_cyan() {
        assert_eq!(complementary("#ff0000").hex, "#00ffff");
    }

    #[test]
    fn triadic_of_red_is_green() {
        assert_eq!(triadic("#ff0000").hex, "#00ff00");
    }

    #[test]
    fn analogous_pair_straddles_the_base_hue() {
        let pair = analogous("#ff0000", DEFAULT_ANALOGOUS_OFFSET);
        assert_eq!(pair.len(), 2);
        let hues: Vec<f64> = pair.iter().map(|s| hex_to_hsl(&s.hex).h).collect();
        assert!((hues[0] - 30.0).abs() <= 1.0);
        assert!((hues[1] - 330.0).abs() <= 1.0);
    }

    #[test]
    fn split_complementary_reduces_saturation() {
        let suggestion = split_complementary("#ff0000");
        let hsl = hex_to_hsl(&suggestion.hex);
        assert!((hsl.h - 210.0).abs() <= 1.0);
        assert!(hsl.s < 100.0);
    }

    #[test]
    fn neutral_variants_are_desaturated_extremes() {
        let light = neutral_variant("#2196f3", ColorRole::NeutralLight);
        let dark = neutral_variant("#2196f3", ColorRole::NeutralDark);
        assert!(hex_to_hsl(&light.hex).l >= 90.0);
        assert!(hex_to_hsl(&dark.hex).l <= 15.0);
    }

    #[test]
    fn core_roles_get_the_full_candidate_set() {
        let set = suggestions_for("#2196f3", ColorRole::Secondary, DEFAULT_ANALOGOUS_OFFSET);
        assert_eq!(set.len(), 5);
        let neutral = suggestions_for("#2196f3", ColorRole::NeutralLight, DEFAULT_ANALOGOUS_OFFSET);
        assert_eq!(neutral.len(), 1);
    }

    #[test]
    fn similarity_uses_euclidean_distance() {
        assert!(are_colors_similar("#ff0000", "#ff0505", 30.0));
        assert!(!are_colors_similar("#ff0000", "#00ff00", 30.0));
    }

    #[test]
    fn filter_keeps_distinct_candidates() {
        let candidates = suggestions_for("#ff0000", ColorRole::Accent, 30.0);
        let existing = vec![Color::new("#ff0000", ColorRole::Primary)];
        let kept = filter_similar(candidates, &existing);
        assert!(kept.len() >= 2);
    }

    #[test]
    fn filter_relaxes_rather_than_starving_the_caller() {
        // Existing palette sits on top of every candidate, so even the
        // relaxed threshold filters everything; the first two come through.
        let candidates = vec![
            Suggestion::new("#00ffff".into(), "Complementary"),
            Suggestion::new("#00ff00".into(), "Triadic"),
        ];
        let existing = vec![
            Color::new("#00ffff", ColorRole::Primary),
            Color::new("#00ff00", ColorRole::Secondary),
        ];
        let kept = filter_similar(candidates, &existing);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn single_candidate_sets_are_not_padded() {
        let candidates = vec![Suggestion::new("#00ffff".into(), "Complementary")];
        let existing = vec![Color::new("#00ffff", ColorRole::Primary)];
        assert!(filter_similar(candidates, &existing).is_empty());
    }
}
