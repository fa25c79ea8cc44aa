//! GPIO fan output through the sysfs GPIO interface.

use std::path::{Path, PathBuf};

use fancontrol_app::ports::Actuator;
use fancontrol_domain::error::FanControlError;
use fancontrol_domain::fan::FanState;

use crate::config::SysfsConfig;
use crate::error::SysfsError;

/// A fan switched by a single GPIO line.
#[derive(Debug)]
pub struct GpioFan {
    value_path: PathBuf,
    active_low: bool,
}

impl GpioFan {
    /// Export the configured pin if needed and configure it as an output.
    ///
    /// The current level is kept so that the fan state survives a restart.
    ///
    /// # Errors
    ///
    /// Returns [`SysfsError`] if the pin cannot be exported or configured.
    pub fn open(config: &SysfsConfig) -> Result<Self, SysfsError> {
        let pin_dir = config.gpio_root.join(format!("gpio{}", config.fan_pin));
        if !pin_dir.exists() {
            tracing::debug!(pin = config.fan_pin, "exporting GPIO pin");
            write_attr(&config.gpio_root.join("export"), &config.fan_pin.to_string())?;
        }

        let direction = pin_dir.join("direction");
        let current = std::fs::read_to_string(&direction).map_err(|err| SysfsError::io(&direction, err))?;
        if current.trim() != "out" {
            write_attr(&direction, "out")?;
        }

        tracing::info!(pin = config.fan_pin, active_low = config.active_low, "GPIO fan ready");
        Ok(Self {
            value_path: pin_dir.join("value"),
            active_low: config.active_low,
        })
    }
}

fn write_attr(path: &Path, value: &str) -> Result<(), SysfsError> {
    std::fs::write(path, value).map_err(|err| SysfsError::io(path, err))
}

impl Actuator for GpioFan {
    fn write(&mut self, state: FanState) -> Result<(), FanControlError> {
        let high = state.is_on() != self.active_low;
        write_attr(&self.value_path, if high { "1" } else { "0" })?;
        Ok(())
    }

    fn read(&self) -> Result<FanState, FanControlError> {
        let raw = std::fs::read_to_string(&self.value_path)
            .map_err(|err| SysfsError::io(&self.value_path, err))?;
        let high = match raw.trim() {
            "1" => true,
            "0" => false,
            other => {
                return Err(SysfsError::Parse {
                    path: self.value_path.clone(),
                    value: other.to_string(),
                }
                .into());
            }
        };
        Ok(FanState::from(high != self.active_low))
    }
}
