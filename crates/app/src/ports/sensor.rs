//! Temperature source port.

use std::future::Future;

use fancontrol_domain::error::FanControlError;
use fancontrol_domain::temperature::Celsius;

/// Reads the temperature the fan protects against.
pub trait TemperatureSource: Send + Sync {
    /// Read a calibrated temperature.
    fn read(&self) -> impl Future<Output = Result<Celsius, FanControlError>> + Send;

    /// Maximum rated temperature, when the sensor exposes one.
    ///
    /// Percentage thresholds are converted against this value.
    fn max_temperature(&self) -> Option<Celsius> {
        None
    }
}

impl<T: TemperatureSource> TemperatureSource for std::sync::Arc<T> {
    fn read(&self) -> impl Future<Output = Result<Celsius, FanControlError>> + Send {
        (**self).read()
    }

    fn max_temperature(&self) -> Option<Celsius> {
        (**self).max_temperature()
    }
}
