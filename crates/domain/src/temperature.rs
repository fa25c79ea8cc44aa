//! Temperature helpers shared by thresholds, smoothing and status payloads.

/// Temperature in degrees Celsius.
pub type Celsius = f64;

/// Number of decimal places kept for published and smoothed values.
pub const DEFAULT_DECIMALS: u32 = 3;

/// Round `value` to `decimals` decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10_f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX).min(12));
    (value * scale).round() / scale
}

/// Convert a percentage of `max` into an absolute temperature.
#[must_use]
pub fn percent_to_celsius(percent: f64, max: Celsius) -> Celsius {
    percent * max / 100.0
}

/// Express `value` as a percentage of `max`.
#[must_use]
pub fn celsius_to_percent(value: Celsius, max: Celsius) -> f64 {
    if max.abs() < f64::EPSILON {
        return 0.0;
    }
    value * 100.0 / max
}
