//! Fixed-width and fixed-precision number text.

/// `value` with exactly `decimals` fractional digits, right-justified to `width`.
///
/// Wider values are never truncated.
pub fn fixed(value: f64, decimals: usize, width: usize) -> String {
    format!("{value:>width$.decimals$}")
}

/// Right-justify (pad on the left) to `width` characters.
pub fn pad_start(s: &str, width: usize) -> String {
    format!("{s:>width$}")
}

/// Left-justify to exactly `width` characters, truncating longer text.
pub fn pad_end(s: &str, width: usize) -> String {
    let truncated: String = s.chars().take(width).collect();
    format!("{truncated:<width$}")
}

/// Round to `decimals` fractional digits.
pub fn round_decimals(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

/// Round to `digits` significant digits.
pub fn round_significant(value: f64, digits: usize) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let precision = digits.saturating_sub(1);
    format!("{value:.precision$e}").parse().unwrap_or(value)
}

/// Shortest text that reads back as `value`; negative zero prints as `0`.
pub fn shortest(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}
