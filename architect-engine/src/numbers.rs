//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Apply an integer percentage, truncating toward zero.
#[must_use]
pub fn scale_pct(value: u64, pct: u32) -> u64 {
    let scaled = u128::from(value) * u128::from(pct) / 100;
    cast::<u128, u64>(scaled).unwrap_or(u64::MAX)
}

/// Multiply by a float factor and truncate, returning 0 for non-finite or negative results.
#[must_use]
pub fn scale_truncate(value: u64, factor: f64) -> u64 {
    floor_f64_to_u64(u64_to_f64(value) * factor)
}

/// Floor a f64 and clamp it to the u64 range, returning 0 for non-finite values.
#[must_use]
pub fn floor_f64_to_u64(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u64, f64>(u64::MAX).unwrap_or(f64::MAX);
    let clamped = value.min(max).floor();
    cast::<f64, u64>(clamped).unwrap_or(u64::MAX)
}

/// Convert u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Ratio of two counters clamped to `[0, 1]`, zero when the denominator is zero.
#[must_use]
pub fn unit_ratio(numerator: u64, denominator: u64) -> f32 {
    if denominator == 0 {
        return 0.0;
    }
    let ratio = u64_to_f64(numerator) / u64_to_f64(denominator);
    cast::<f64, f32>(ratio.clamp(0.0, 1.0)).unwrap_or(0.0)
}
