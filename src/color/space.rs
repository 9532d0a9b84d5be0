//! Color space conversions and contrast metrics for palette colors.
//!
//! All functions take and return plain hex strings so the rule engine can
//! stay free of any rendering-layer color types. Malformed hex input is
//! tolerated (black fallback) rather than rejected here; rejection happens
//! at the DTO boundary before a value can enter a palette.

/// A color in 8-bit sRGB channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

/// A color in HSL space: hue in `[0, 360)`, saturation and lightness in `[0, 100]`.
///
/// Fields are `f64` so harmony math can scale them fractionally; conversions
/// to and from hex round the HSL side to whole units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Hue in degrees.
    pub h: f64,
    /// Saturation percentage.
    pub s: f64,
    /// Lightness percentage.
    pub l: f64,
}

/// Parse a 6-digit hex string (leading `#` optional, case-insensitive).
///
/// Malformed input yields black, matching the editor's lenient display path.
pub fn hex_to_rgb(hex: &str) -> Rgb {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Rgb { r: 0, g: 0, b: 0 };
    }

    let channel = |range| u8::from_str_radix(&digits[range], 16).unwrap_or(0);
    Rgb {
        r: channel(0..2),
        g: channel(2..4),
        b: channel(4..6),
    }
}

/// Format floating-point channels as a lowercase `#rrggbb` string.
///
/// Channels are rounded and clamped to `[0, 255]`.
pub fn rgb_to_hex(r: f64, g: f64, b: f64) -> String {
    let clamp = |c: f64| c.round().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", clamp(r), clamp(g), clamp(b))
}

/// Canonical display form of a hex color: `#RRGGBB`, uppercase.
pub fn display_hex(hex: &str) -> String {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    format!("#{}", digits.to_ascii_uppercase())
}

/// Case-insensitive equality of two hex strings, ignoring the leading `#`.
pub fn hex_eq(a: &str, b: &str) -> bool {
    let strip = |h: &str| h.trim_start_matches('#').to_ascii_lowercase();
    strip(a) == strip(b)
}

/// Convert a hex color to HSL with hue, saturation, and lightness rounded to integers.
pub fn hex_to_hsl(hex: &str) -> Hsl {
    let Rgb { r, g, b } = hex_to_rgb(hex);
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        // Achromatic: hue and saturation are zero by convention.
        return Hsl {
            h: 0.0,
            s: 0.0,
            l: (l * 100.0).round(),
        };
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    } / 6.0;

    Hsl {
        h: (h * 360.0).round() % 360.0,
        s: (s * 100.0).round(),
        l: (l * 100.0).round(),
    }
}

/// Convert HSL components back to a lowercase hex string.
///
/// Hue wraps modulo 360 and may be negative; saturation and lightness are
/// clamped to `[0, 100]`.
pub fn hsl_to_hex(hsl: Hsl) -> String {
    let h = hsl.h.rem_euclid(360.0) / 360.0;
    let s = (hsl.s.clamp(0.0, 100.0)) / 100.0;
    let l = (hsl.l.clamp(0.0, 100.0)) / 100.0;

    if s == 0.0 {
        let gray = l * 255.0;
        return rgb_to_hex(gray, gray, gray);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let r = hue_to_channel(p, q, h + 1.0 / 3.0);
    let g = hue_to_channel(p, q, h);
    let b = hue_to_channel(p, q, h - 1.0 / 3.0);

    rgb_to_hex(r * 255.0, g * 255.0, b * 255.0)
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// WCAG 2.0 relative luminance of a hex color.
///
/// sRGB channels are linearized (`c/12.92` below the 0.03928 knee, gamma 2.4
/// above) and combined with the BT.709 weights.
pub fn relative_luminance(hex: &str) -> f64 {
    let Rgb { r, g, b } = hex_to_rgb(hex);
    let linear = |c: u8| {
        let c = f64::from(c) / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}

/// WCAG 2.0 contrast ratio between two hex colors, in `[1, 21]`.
pub fn contrast_ratio(a: &str, b: &str) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Pick black or white text for a background color.
///
/// Uses the legacy YIQ perceived-brightness formula with a threshold of 128.
/// Coarser than [`contrast_ratio`], but readability badges track this one.
pub fn contrast_text_color(hex: &str) -> &'static str {
    let Rgb { r, g, b } = hex_to_rgb(hex);
    let brightness =
        (f64::from(r) * 299.0 + f64::from(g) * 587.0 + f64::from(b) * 114.0) / 1000.0;
    if brightness >= 128.0 { "#000000" } else { "#ffffff" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_case_insensitively() {
        assert_eq!(hex_to_rgb("#2196F3"), Rgb { r: 33, g: 150, b: 243 });
        assert_eq!(hex_to_rgb("2196f3"), Rgb { r: 33, g: 150, b: 243 });
    }

    #[test]
    fn malformed_hex_falls_back_to_black() {
        assert_eq!(hex_to_rgb("#12"), Rgb { r: 0, g: 0, b: 0 });
        assert_eq!(hex_to_rgb("#12345g"), Rgb { r: 0, g: 0, b: 0 });
        assert_eq!(hex_to_rgb(""), Rgb { r: 0, g: 0, b: 0 });
    }

    #[test]
    fn rgb_round_trip_is_exact() {
        for hex in ["#000000", "#ffffff", "#2196f3", "#f9f9f9", "#1a1a1a"] {
            let Rgb { r, g, b } = hex_to_rgb(hex);
            assert_eq!(
                rgb_to_hex(f64::from(r), f64::from(g), f64::from(b)),
                hex
            );
        }
    }

    #[test]
    fn rgb_to_hex_clamps_and_pads() {
        assert_eq!(rgb_to_hex(-4.0, 300.0, 7.0), "#00ff07");
    }

    #[test]
    fn hsl_round_trip_within_rounding_error() {
        for hex in ["#2196f3", "#e91e63", "#4caf50", "#808080"] {
            let back = hsl_to_hex(hex_to_hsl(hex));
            let a = hex_to_rgb(hex);
            let b = hex_to_rgb(&back);
            // Integer rounding on the HSL side allows a small per-channel drift.
            assert!(i16::from(a.r).abs_diff(i16::from(b.r)) <= 3, "{hex} -> {back}");
            assert!(i16::from(a.g).abs_diff(i16::from(b.g)) <= 3, "{hex} -> {back}");
            assert!(i16::from(a.b).abs_diff(i16::from(b.b)) <= 3, "{hex} -> {back}");
        }
    }

    #[test]
    fn known_hue_values() {
        let red = hex_to_hsl("#ff0000");
        assert_eq!(red.h, 0.0);
        assert_eq!(red.s, 100.0);
        assert_eq!(red.l, 50.0);

        let green = hex_to_hsl("#00ff00");
        assert_eq!(green.h, 120.0);
    }

    #[test]
    fn black_white_contrast_is_21() {
        assert!((contrast_ratio("#000000", "#ffffff") - 21.0).abs() < 0.01);
    }

    #[test]
    fn contrast_is_symmetric_and_reflexive() {
        let pairs = [("#2196f3", "#f9f9f9"), ("#111111", "#333333")];
        for (a, b) in pairs {
            assert_eq!(contrast_ratio(a, b), contrast_ratio(b, a));
        }
        assert!((contrast_ratio("#2196f3", "#2196f3") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn text_color_threshold() {
        assert_eq!(contrast_text_color("#ffffff"), "#000000");
        assert_eq!(contrast_text_color("#000000"), "#ffffff");
        // Brightness of #2196f3 is (33*299 + 150*587 + 243*114)/1000 ≈ 125.6.
        assert_eq!(contrast_text_color("#2196f3"), "#ffffff");
    }

    #[test]
    fn display_hex_uppercases() {
        assert_eq!(display_hex("#2196f3"), "#2196F3");
        assert_eq!(display_hex("2196f3"), "#2196F3");
    }

    #[test]
    fn hex_eq_ignores_case_and_hash() {
        assert!(hex_eq("#FF0000", "ff0000"));
        assert!(!hex_eq("#ff0000", "#ff0001"));
    }
}
