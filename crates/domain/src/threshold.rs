//! Thresholds: the on/off temperature pair and the store guarding it.
//!
//! Thresholds are held as absolute temperatures. Percentages of the
//! configured maximum are accepted on input and derived on output.
//!
//! The store never rejects a value: each bound is clamped to its own
//! `[min, max]` range, then the pair is swapped if `off > on`.

use serde::Deserialize;

use crate::temperature::{Celsius, DEFAULT_DECIMALS, celsius_to_percent, percent_to_celsius, round_to};

const ON_PERCENT_DEFAULTS: (f64, f64, f64) = (85.0, 80.0, 95.0);
const OFF_PERCENT_DEFAULTS: (f64, f64, f64) = (75.0, 60.0, 75.0);
const DEFAULT_MAX_TEMPERATURE: Celsius = 75.0;

/// Unit in which a bound is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdUnit {
    /// Percentage of the maximum rated temperature.
    #[default]
    Percent,
    /// Absolute degrees Celsius.
    Celsius,
}

/// Configuration of one bound. Missing values fall back to built-in
/// percentage defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BoundConfig {
    pub unit: ThresholdUnit,
    pub default: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Threshold configuration as read from the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Maximum rated temperature used when the sensor does not expose one.
    pub max_temperature: Celsius,
    /// Temperature at which the fan is switched on.
    pub on: BoundConfig,
    /// Temperature at which the fan is switched off.
    pub off: BoundConfig,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            max_temperature: DEFAULT_MAX_TEMPERATURE,
            on: BoundConfig::default(),
            off: BoundConfig::default(),
        }
    }
}

impl ThresholdConfig {
    /// Resolve the configuration into absolute limits against `max_temperature`.
    #[must_use]
    pub fn resolve(&self, max_temperature: Celsius) -> ThresholdLimits {
        ThresholdLimits {
            max_temperature,
            on: BoundLimits::resolve(&self.on, ON_PERCENT_DEFAULTS, max_temperature),
            off: BoundLimits::resolve(&self.off, OFF_PERCENT_DEFAULTS, max_temperature),
        }
    }
}

/// Absolute default and range of one bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundLimits {
    pub default: Celsius,
    pub min: Celsius,
    pub max: Celsius,
}

impl BoundLimits {
    /// Build limits, normalizing an inverted range and pulling the default
    /// inside it.
    #[must_use]
    pub fn new(default: Celsius, min: Celsius, max: Celsius) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            default: default.clamp(min, max),
            min,
            max,
        }
    }

    fn resolve(config: &BoundConfig, fallback: (f64, f64, f64), max_temperature: Celsius) -> Self {
        let (fallback_default, fallback_min, fallback_max) = fallback;
        let to_celsius = |value: f64| match config.unit {
            ThresholdUnit::Percent => percent_to_celsius(value, max_temperature),
            ThresholdUnit::Celsius => value,
        };
        // Non-finite values cannot order against the range; use the fallback.
        let pick = |value: Option<f64>, fallback: f64| {
            value
                .filter(|value| value.is_finite())
                .map_or_else(|| percent_to_celsius(fallback, max_temperature), to_celsius)
        };
        Self::new(
            pick(config.default, fallback_default),
            pick(config.min, fallback_min),
            pick(config.max, fallback_max),
        )
    }

    /// Clamp `value` into `[min, max]`.
    #[must_use]
    pub fn clamp(&self, value: Celsius) -> Celsius {
        value.clamp(self.min, self.max)
    }
}

/// Both bounds plus the maximum used for percentage conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdLimits {
    pub max_temperature: Celsius,
    pub on: BoundLimits,
    pub off: BoundLimits,
}

/// The two control thresholds. Invariant: `off <= on`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPair {
    pub on: Celsius,
    pub off: Celsius,
}

impl ThresholdPair {
    fn ordered(on: Celsius, off: Celsius) -> (Self, bool) {
        if off > on {
            (Self { on: off, off: on }, true)
        } else {
            (Self { on, off }, false)
        }
    }
}

/// A threshold value as supplied by an operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdValue {
    Celsius(Celsius),
    Percent(f64),
}

impl ThresholdValue {
    #[must_use]
    pub fn to_celsius(self, max_temperature: Celsius) -> Celsius {
        match self {
            Self::Celsius(value) => value,
            Self::Percent(value) => percent_to_celsius(value, max_temperature),
        }
    }
}

/// Result of writing one bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    /// The pair after clamping and ordering.
    pub pair: ThresholdPair,
    /// The requested value was outside the bound's range.
    pub clamped: bool,
    /// The bounds were swapped to restore `off <= on`.
    pub swapped: bool,
}

/// Thresholds expressed as percentages of the maximum temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentPair {
    pub on: f64,
    pub off: f64,
}

/// Holder of the current [`ThresholdPair`].
#[derive(Debug, Clone)]
pub struct ThresholdStore {
    limits: ThresholdLimits,
    pair: ThresholdPair,
}

impl ThresholdStore {
    /// Create a store initialised with the configured defaults.
    #[must_use]
    pub fn new(limits: ThresholdLimits) -> Self {
        let (pair, _) = ThresholdPair::ordered(limits.on.default, limits.off.default);
        Self { limits, pair }
    }

    #[must_use]
    pub fn get(&self) -> ThresholdPair {
        self.pair
    }

    #[must_use]
    pub fn limits(&self) -> &ThresholdLimits {
        &self.limits
    }

    #[must_use]
    pub fn max_temperature(&self) -> Celsius {
        self.limits.max_temperature
    }

    /// Set the switch-on threshold.
    pub fn set_on(&mut self, value: ThresholdValue) -> Adjustment {
        let requested = value.to_celsius(self.limits.max_temperature);
        let applied = self.limits.on.clamp(requested);
        self.apply(applied, self.pair.off, requested != applied)
    }

    /// Set the switch-off threshold.
    pub fn set_off(&mut self, value: ThresholdValue) -> Adjustment {
        let requested = value.to_celsius(self.limits.max_temperature);
        let applied = self.limits.off.clamp(requested);
        self.apply(self.pair.on, applied, requested != applied)
    }

    /// Restore both bounds to their configured defaults.
    pub fn reset(&mut self) -> ThresholdPair {
        let (pair, _) = ThresholdPair::ordered(self.limits.on.default, self.limits.off.default);
        self.pair = pair;
        pair
    }

    /// Current thresholds as percentages, rounded to the published precision.
    #[must_use]
    pub fn percentages(&self) -> PercentPair {
        let max = self.limits.max_temperature;
        PercentPair {
            on: round_to(celsius_to_percent(self.pair.on, max), DEFAULT_DECIMALS),
            off: round_to(celsius_to_percent(self.pair.off, max), DEFAULT_DECIMALS),
        }
    }

    fn apply(&mut self, on: Celsius, off: Celsius, clamped: bool) -> Adjustment {
        let (pair, swapped) = ThresholdPair::ordered(on, off);
        self.pair = pair;
        Adjustment {
            pair,
            clamped,
            swapped,
        }
    }
}
