//! Exponential smoothing of raw sensor readings.

use chrono::{DateTime, Utc};

use crate::temperature::{Celsius, DEFAULT_DECIMALS, round_to};

/// Default weight of a new raw reading.
pub const DEFAULT_FACTOR: f64 = 0.2;

/// One sensor reading together with the filter output it produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub raw: Celsius,
    pub smoothed: Celsius,
    pub taken_at: DateTime<Utc>,
}

impl Sample {
    /// Stamp a reading with the current time.
    #[must_use]
    pub fn now(raw: Celsius, smoothed: Celsius) -> Self {
        Self {
            raw,
            smoothed,
            taken_at: Utc::now(),
        }
    }
}

/// `smoothed = factor * raw + (1 - factor) * previous`, rounded to a
/// fixed number of decimals. The first reading seeds the filter.
#[derive(Debug, Clone)]
pub struct ExponentialFilter {
    factor: f64,
    decimals: u32,
    value: Option<Celsius>,
}

impl Default for ExponentialFilter {
    fn default() -> Self {
        Self::new(DEFAULT_FACTOR, DEFAULT_DECIMALS)
    }
}

impl ExponentialFilter {
    /// Create a filter; `factor` is clamped into `(0, 1]`.
    #[must_use]
    pub fn new(factor: f64, decimals: u32) -> Self {
        let factor = if factor.is_finite() && factor > 0.0 {
            factor.min(1.0)
        } else {
            DEFAULT_FACTOR
        };
        Self {
            factor,
            decimals,
            value: None,
        }
    }

    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Feed a raw reading and return the new smoothed value.
    pub fn update(&mut self, raw: Celsius) -> Celsius {
        let next = match self.value {
            Some(previous) => self.factor * raw + (1.0 - self.factor) * previous,
            None => raw,
        };
        let next = round_to(next, self.decimals);
        self.value = Some(next);
        next
    }

    /// Last smoothed value, if any reading has been fed.
    #[must_use]
    pub fn value(&self) -> Option<Celsius> {
        self.value
    }
}
