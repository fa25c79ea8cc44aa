//! Fan controller: the single owner of thresholds and actuator state.
//!
//! Every read and write of the threshold pair, the fan state and the
//! smoothing filter goes through one lock. The lock is never held across
//! an `.await`: sensor reads happen before taking it and publication after
//! releasing it, using the values captured while it was held.

use std::sync::{Mutex, MutexGuard, PoisonError};

use fancontrol_domain::command::Command;
use fancontrol_domain::error::FanControlError;
use fancontrol_domain::fan::FanState;
use fancontrol_domain::hysteresis::decide;
use fancontrol_domain::smoothing::{ExponentialFilter, Sample};
use fancontrol_domain::status::{StatusSnapshot, StatusUpdate};
use fancontrol_domain::temperature::Celsius;
use fancontrol_domain::threshold::{ThresholdPair, ThresholdStore, ThresholdValue};

use crate::ports::{Actuator, TemperatureSource};
use crate::settings::ControlConfig;

#[derive(Debug, Clone, Copy)]
enum Bound {
    On,
    Off,
}

struct ControlState<A> {
    thresholds: ThresholdStore,
    fan: FanState,
    filter: ExponentialFilter,
    actuator: A,
}

impl<A: Actuator> ControlState<A> {
    fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            fan: self.fan,
            thresholds: self.thresholds.get(),
            percentages: self.thresholds.percentages(),
        }
    }

    /// Drive the actuator to `desired` if it differs from the known state.
    ///
    /// On a failed write the known state is left untouched so the next
    /// evaluation retries the transition.
    fn switch(&mut self, desired: FanState) -> Option<StatusUpdate> {
        if desired == self.fan {
            tracing::debug!(state = %desired, "fan already in requested state");
            return None;
        }
        match self.actuator.write(desired) {
            Ok(()) => {
                tracing::info!(from = %self.fan, to = %desired, "fan switched");
                self.fan = desired;
                Some(StatusUpdate::fan(desired))
            }
            Err(err) => {
                tracing::error!(state = %desired, error = ?err, "failed to drive fan");
                None
            }
        }
    }

    fn adjust(&mut self, bound: Bound, value: ThresholdValue) -> Vec<StatusUpdate> {
        let before = self.thresholds.get();
        let adjustment = match bound {
            Bound::On => self.thresholds.set_on(value),
            Bound::Off => self.thresholds.set_off(value),
        };
        if adjustment.clamped {
            tracing::info!(
                ?bound,
                requested = ?value,
                on = adjustment.pair.on,
                off = adjustment.pair.off,
                "threshold clamped to configured range"
            );
        }
        if adjustment.swapped {
            tracing::info!(
                on = adjustment.pair.on,
                off = adjustment.pair.off,
                "thresholds swapped to keep off below on"
            );
        }
        if adjustment.pair == before {
            return Vec::new();
        }
        tracing::info!(
            on = adjustment.pair.on,
            off = adjustment.pair.off,
            "thresholds updated"
        );
        self.snapshot().threshold_updates()
    }
}

/// Application service owning the control state.
pub struct FanController<S, A> {
    sensor: S,
    state: Mutex<ControlState<A>>,
}

impl<S, A> FanController<S, A>
where
    S: TemperatureSource,
    A: Actuator,
{
    /// Create a controller. The initial fan state is read back from the
    /// actuator, falling back to off when it cannot be read.
    pub fn new(sensor: S, actuator: A, thresholds: ThresholdStore, filter: ExponentialFilter) -> Self {
        let fan = actuator.read().unwrap_or_else(|err| {
            tracing::warn!(error = ?err, "could not read fan state, assuming off");
            FanState::Off
        });
        let pair = thresholds.get();
        tracing::info!(fan = %fan, on = pair.on, off = pair.off, "controller ready");
        Self {
            sensor,
            state: Mutex::new(ControlState {
                thresholds,
                fan,
                filter,
                actuator,
            }),
        }
    }

    /// Create a controller from settings. Percentage thresholds are resolved
    /// against the sensor's rated maximum when it exposes one.
    pub fn from_config(sensor: S, actuator: A, config: &ControlConfig) -> Self {
        let max_temperature = sensor
            .max_temperature()
            .filter(|max| max.is_finite() && *max > 0.0)
            .unwrap_or(config.thresholds.max_temperature);
        let thresholds = ThresholdStore::new(config.thresholds.resolve(max_temperature));
        Self::new(sensor, actuator, thresholds, config.smoothing.filter())
    }

    fn lock(&self) -> MutexGuard<'_, ControlState<A>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the sensor and feed the smoothing filter.
    ///
    /// # Errors
    ///
    /// Returns the sensor error; the filter is left untouched.
    pub async fn sample(&self) -> Result<Sample, FanControlError> {
        let raw = self.sensor.read().await?;
        let smoothed = self.lock().filter.update(raw);
        Ok(Sample::now(raw, smoothed))
    }

    /// Run the hysteresis on the smoothed temperature and drive the fan.
    ///
    /// Returns the status update to publish when a transition happened.
    pub fn evaluate(&self) -> Option<StatusUpdate> {
        let mut state = self.lock();
        let Some(temperature) = state.filter.value() else {
            tracing::debug!("no sample yet, skipping evaluation");
            return None;
        };
        let thresholds = state.thresholds.get();
        let desired = decide(temperature, thresholds, state.fan);
        if desired == state.fan {
            return None;
        }
        tracing::info!(
            temperature,
            on = thresholds.on,
            off = thresholds.off,
            to = %desired,
            "threshold crossed"
        );
        state.switch(desired)
    }

    /// Apply a decoded command and return the status updates it produced.
    ///
    /// [`Command::Exit`] does not touch the control state; the caller owns
    /// process shutdown.
    pub fn apply(&self, command: Command) -> Vec<StatusUpdate> {
        let mut state = self.lock();
        match command {
            Command::SetOn => state.switch(FanState::On).into_iter().collect(),
            Command::SetOff => state.switch(FanState::Off).into_iter().collect(),
            Command::Toggle => {
                let desired = state.fan.toggled();
                state.switch(desired).into_iter().collect()
            }
            Command::SetPercentOn(value) => state.adjust(Bound::On, ThresholdValue::Percent(value)),
            Command::SetPercentOff(value) => {
                state.adjust(Bound::Off, ThresholdValue::Percent(value))
            }
            Command::SetTempOn(value) => state.adjust(Bound::On, ThresholdValue::Celsius(value)),
            Command::SetTempOff(value) => state.adjust(Bound::Off, ThresholdValue::Celsius(value)),
            Command::Status => state.snapshot().updates(),
            Command::Reset => {
                let pair = state.thresholds.reset();
                tracing::info!(on = pair.on, off = pair.off, "thresholds reset to defaults");
                state.snapshot().threshold_updates()
            }
            Command::Exit => Vec::new(),
        }
    }

    /// Switch the fan off regardless of temperature.
    pub fn force_off(&self) -> Option<StatusUpdate> {
        self.lock().switch(FanState::Off)
    }

    #[must_use]
    pub fn snapshot(&self) -> StatusSnapshot {
        self.lock().snapshot()
    }

    #[must_use]
    pub fn fan_state(&self) -> FanState {
        self.lock().fan
    }

    #[must_use]
    pub fn thresholds(&self) -> ThresholdPair {
        self.lock().thresholds.get()
    }

    /// Latest smoothed temperature.
    #[must_use]
    pub fn temperature(&self) -> Option<Celsius> {
        self.lock().filter.value()
    }
}
