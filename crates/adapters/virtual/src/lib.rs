//! # fancontrol-adapter-virtual
//!
//! Simulated hardware for running the daemon without a board and for
//! end-to-end tests.
//!
//! The temperature rises by `heat_rate` on every read while the fan is
//! idle and falls by `cool_rate` while it runs, staying between the
//! ambient and the maximum temperature.
//!
//! ## Dependency rule
//!
//! Depends on `fancontrol-app` (port traits) and `fancontrol-domain` only.

mod config;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fancontrol_app::ports::{Actuator, TemperatureSource};
use fancontrol_domain::error::FanControlError;
use fancontrol_domain::fan::FanState;
use fancontrol_domain::temperature::Celsius;

pub use config::VirtualConfig;

struct Simulation {
    temperature: Celsius,
    fan: FanState,
    failing: bool,
    ambient: Celsius,
    ceiling: Celsius,
    heat_rate: f64,
    cool_rate: f64,
}

impl Simulation {
    fn step(&mut self) -> Celsius {
        self.temperature = if self.fan.is_on() {
            (self.temperature - self.cool_rate).max(self.ambient)
        } else {
            (self.temperature + self.heat_rate).min(self.ceiling)
        };
        self.temperature
    }
}

/// Shared handle on the simulated board.
#[derive(Clone)]
pub struct VirtualHardware {
    sim: Arc<Mutex<Simulation>>,
    max_temperature: Option<Celsius>,
}

impl VirtualHardware {
    #[must_use]
    pub fn new(config: &VirtualConfig) -> Self {
        let ceiling = config.max_temperature.unwrap_or(100.0);
        Self {
            sim: Arc::new(Mutex::new(Simulation {
                temperature: config.initial_temperature,
                fan: FanState::Off,
                failing: false,
                ambient: config.ambient_temperature.min(ceiling),
                ceiling,
                heat_rate: config.heat_rate.abs(),
                cool_rate: config.cool_rate.abs(),
            })),
            max_temperature: config.max_temperature,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Simulation> {
        self.sim.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn sensor(&self) -> VirtualSensor {
        VirtualSensor {
            hardware: self.clone(),
        }
    }

    #[must_use]
    pub fn fan(&self) -> VirtualFan {
        VirtualFan {
            hardware: self.clone(),
        }
    }

    pub fn set_temperature(&self, temperature: Celsius) {
        self.lock().temperature = temperature;
    }

    #[must_use]
    pub fn temperature(&self) -> Celsius {
        self.lock().temperature
    }

    #[must_use]
    pub fn fan_state(&self) -> FanState {
        self.lock().fan
    }

    /// Make fan writes fail, as a disconnected output would.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }
}

/// Simulated temperature sensor.
pub struct VirtualSensor {
    hardware: VirtualHardware,
}

impl TemperatureSource for VirtualSensor {
    async fn read(&self) -> Result<Celsius, FanControlError> {
        Ok(self.hardware.lock().step())
    }

    fn max_temperature(&self) -> Option<Celsius> {
        self.hardware.max_temperature
    }
}

/// Simulated fan output.
pub struct VirtualFan {
    hardware: VirtualHardware,
}

impl Actuator for VirtualFan {
    fn write(&mut self, state: FanState) -> Result<(), FanControlError> {
        let mut sim = self.hardware.lock();
        if sim.failing {
            return Err(FanControlError::Hardware("virtual fan output failure".into()));
        }
        tracing::debug!(state = %state, "virtual fan switched");
        sim.fan = state;
        Ok(())
    }

    fn read(&self) -> Result<FanState, FanControlError> {
        Ok(self.hardware.lock().fan)
    }
}
