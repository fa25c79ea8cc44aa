//! # fancontrol-adapter-sysfs
//!
//! Linux sysfs hardware adapter.
//!
//! ## Provided adapters
//!
//! | Adapter | Port | Files |
//! |---------|------|-------|
//! | [`ThermalZoneSensor`] | `TemperatureSource` | `<zone>/temp`, `<zone>/trip_point_0_temp` |
//! | [`GpioFan`] | `Actuator` | `<gpio>/export`, `<gpio>/gpioN/{direction,value}` |
//!
//! ## Dependency rule
//!
//! Depends on `fancontrol-app` (port traits) and `fancontrol-domain` only.

pub mod config;
pub mod error;
mod gpio;
mod thermal;

pub use config::SysfsConfig;
pub use error::SysfsError;
pub use gpio::GpioFan;
pub use thermal::ThermalZoneSensor;
