//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a value is a `#`-prefixed 3- or 6-digit hex color.
///
/// # Examples
///
/// ```ignore
/// validate_hex_color("#2196F3") // Ok
/// validate_hex_color("#abc")    // Ok - shorthand
/// validate_hex_color("2196F3")  // Err - missing '#'
/// validate_hex_color("#21963")  // Err - wrong length
/// ```
pub fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    let Some(digits) = value.strip_prefix('#') else {
        let mut err = ValidationError::new("hex_format");
        err.message = Some("Hex color must start with '#'".into());
        return Err(err);
    };

    if digits.len() != 3 && digits.len() != 6 {
        let mut err = ValidationError::new("hex_length");
        err.message = Some(
            format!(
                "Hex color must have 3 or 6 digits (got {})",
                digits.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        let mut err = ValidationError::new("hex_digits");
        err.message = Some("Hex color must contain only hexadecimal characters".into());
        return Err(err);
    }

    Ok(())
}

/// Expand 3-digit shorthand and lowercase a validated hex color.
pub fn normalize_hex(value: &str) -> String {
    let digits = value.trim_start_matches('#');
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };
    format!("#{}", expanded.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_hex_color_valid() {
        assert!(validate_hex_color("#2196F3").is_ok());
        assert!(validate_hex_color("#2196f3").is_ok());
        assert!(validate_hex_color("#abc").is_ok());
        assert!(validate_hex_color("#000000").is_ok());
    }

    #[test]
    fn test_validate_hex_color_invalid() {
        assert!(validate_hex_color("2196F3").is_err()); // missing '#'
        assert!(validate_hex_color("#21963").is_err()); // 5 digits
        assert!(validate_hex_color("#21963fa").is_err()); // 7 digits
        assert!(validate_hex_color("#21963g").is_err()); // invalid hex
        assert!(validate_hex_color("#").is_err()); // empty
        assert!(validate_hex_color("").is_err()); // no prefix at all
    }

    #[test]
    fn test_normalize_hex() {
        assert_eq!(normalize_hex("#ABC"), "#aabbcc");
        assert_eq!(normalize_hex("#2196F3"), "#2196f3");
    }
}
