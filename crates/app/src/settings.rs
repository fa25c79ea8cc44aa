//! Control settings: thresholds, smoothing, timer cadence and exit policy.
//!
//! Timer values outside their allowed range are clamped, never rejected.

use std::time::Duration;

use serde::Deserialize;

use fancontrol_domain::smoothing::{DEFAULT_FACTOR, ExponentialFilter};
use fancontrol_domain::temperature::DEFAULT_DECIMALS;
use fancontrol_domain::threshold::ThresholdConfig;

/// Settings consumed by the control core.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub thresholds: ThresholdConfig,
    pub smoothing: SmoothingConfig,
    pub timers: TimerConfig,
    /// What happens to the fan when the process exits.
    pub on_exit: ExitPolicy,
}

/// Exponential smoothing parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Weight of a new raw reading, in `(0, 1]`.
    pub factor: f64,
    /// Decimal places kept on the smoothed value.
    pub decimals: u32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            factor: DEFAULT_FACTOR,
            decimals: DEFAULT_DECIMALS,
        }
    }
}

impl SmoothingConfig {
    #[must_use]
    pub fn filter(&self) -> ExponentialFilter {
        ExponentialFilter::new(self.factor, self.decimals)
    }
}

/// Shutdown policy for the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitPolicy {
    /// Leave the fan in its last commanded state.
    #[default]
    Keep,
    /// Switch the fan off before going offline.
    Off,
}

/// Timer cadence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Sampling period, clamped to `1..=60` seconds.
    pub measure_period_secs: f64,
    /// Publish the temperature every Nth sample, clamped to `1..=10`.
    pub publish_prescale: u32,
    /// Evaluate the hysteresis every Nth sample, clamped to `1..=1000`.
    pub trigger_prescale: u32,
    /// Reconnect check period, clamped to `5..=600` seconds.
    pub reconnect_period_secs: f64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            measure_period_secs: 5.0,
            publish_prescale: 3,
            trigger_prescale: 6,
            reconnect_period_secs: 30.0,
        }
    }
}

impl TimerConfig {
    #[must_use]
    pub fn measure_period(&self) -> Duration {
        clamp_secs("measure_period_secs", self.measure_period_secs, 5.0, 1.0, 60.0)
    }

    #[must_use]
    pub fn publish_prescale(&self) -> u32 {
        clamp_count("publish_prescale", self.publish_prescale, 1, 10)
    }

    #[must_use]
    pub fn trigger_prescale(&self) -> u32 {
        clamp_count("trigger_prescale", self.trigger_prescale, 1, 1000)
    }

    #[must_use]
    pub fn reconnect_period(&self) -> Duration {
        clamp_secs(
            "reconnect_period_secs",
            self.reconnect_period_secs,
            30.0,
            5.0,
            600.0,
        )
    }
}

fn clamp_secs(setting: &'static str, value: f64, fallback: f64, min: f64, max: f64) -> Duration {
    let applied = if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    };
    if (applied - value).abs() > f64::EPSILON || !value.is_finite() {
        tracing::warn!(setting, requested = value, applied, "timer setting clamped");
    }
    Duration::from_secs_f64(applied)
}

fn clamp_count(setting: &'static str, value: u32, min: u32, max: u32) -> u32 {
    let applied = value.clamp(min, max);
    if applied != value {
        tracing::warn!(setting, requested = value, applied, "timer setting clamped");
    }
    applied
}
