//! Numeric rounding and text rendering shared by the writers.

/// Round half away from zero to `places` decimal places
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Render a float in its shortest round-trip form, keeping one decimal on
/// integral values (`4.0`, not `4`).
#[must_use]
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Helper function to convert a count to f64 with explicit precision loss allowance
#[inline]
#[must_use]
pub fn count_to_f64(count: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}
