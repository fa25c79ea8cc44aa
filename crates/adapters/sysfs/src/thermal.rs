//! Thermal zone sensor: reads the SoC temperature from sysfs.

use std::path::{Path, PathBuf};

use fancontrol_app::ports::TemperatureSource;
use fancontrol_domain::error::FanControlError;
use fancontrol_domain::temperature::Celsius;

use crate::error::SysfsError;

/// A `/sys/class/thermal/thermal_zoneN` directory.
#[derive(Debug)]
pub struct ThermalZoneSensor {
    temp_path: PathBuf,
    max_temperature: Option<Celsius>,
}

impl ThermalZoneSensor {
    /// Open a thermal zone, checking that its temperature is readable.
    ///
    /// The first trip point, when present and positive, is used as the
    /// maximum rated temperature.
    ///
    /// # Errors
    ///
    /// Returns [`SysfsError`] if `temp` cannot be read or parsed.
    pub fn open(zone: impl AsRef<Path>) -> Result<Self, SysfsError> {
        let zone = zone.as_ref();
        let temp_path = zone.join("temp");
        let raw = std::fs::read_to_string(&temp_path).map_err(|err| SysfsError::io(&temp_path, err))?;
        let current = parse_millidegrees(&temp_path, &raw)?;

        let trip_path = zone.join("trip_point_0_temp");
        let max_temperature = match std::fs::read_to_string(&trip_path) {
            Ok(raw) => match parse_millidegrees(&trip_path, &raw) {
                Ok(max) if max > 0.0 => Some(max),
                Ok(_) => None,
                Err(err) => {
                    tracing::warn!(error = %err, "ignoring unreadable trip point");
                    None
                }
            },
            Err(_) => None,
        };

        tracing::info!(
            zone = %zone.display(),
            current,
            max_temperature = ?max_temperature,
            "thermal zone opened"
        );
        Ok(Self {
            temp_path,
            max_temperature,
        })
    }
}

fn parse_millidegrees(path: &Path, raw: &str) -> Result<Celsius, SysfsError> {
    let value: i32 = raw.trim().parse().map_err(|_| SysfsError::Parse {
        path: path.to_path_buf(),
        value: raw.trim().to_string(),
    })?;
    Ok(f64::from(value) / 1000.0)
}

impl TemperatureSource for ThermalZoneSensor {
    async fn read(&self) -> Result<Celsius, FanControlError> {
        let raw = tokio::fs::read_to_string(&self.temp_path)
            .await
            .map_err(|err| SysfsError::io(&self.temp_path, err))?;
        Ok(parse_millidegrees(&self.temp_path, &raw)?)
    }

    fn max_temperature(&self) -> Option<Celsius> {
        self.max_temperature
    }
}
