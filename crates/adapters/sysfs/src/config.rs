//! Sysfs adapter configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Paths and pin used by the sysfs adapters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SysfsConfig {
    /// Thermal zone directory holding `temp` in millidegrees Celsius.
    pub thermal_zone: PathBuf,
    /// Root of the sysfs GPIO interface.
    pub gpio_root: PathBuf,
    /// GPIO line driving the fan.
    pub fan_pin: u32,
    /// Drive the line low to switch the fan on.
    pub active_low: bool,
}

impl Default for SysfsConfig {
    fn default() -> Self {
        Self {
            thermal_zone: PathBuf::from("/sys/class/thermal/thermal_zone0"),
            gpio_root: PathBuf::from("/sys/class/gpio"),
            fan_pin: 14,
            active_low: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = SysfsConfig::default();
        assert_eq!(
            config.thermal_zone,
            PathBuf::from("/sys/class/thermal/thermal_zone0")
        );
        assert_eq!(config.gpio_root, PathBuf::from("/sys/class/gpio"));
        assert_eq!(config.fan_pin, 14);
        assert!(!config.active_low);
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            thermal_zone = "/sys/class/thermal/thermal_zone1"
            fan_pin = 18
            active_low = true
        "#;
        let config: SysfsConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.thermal_zone,
            PathBuf::from("/sys/class/thermal/thermal_zone1")
        );
        assert_eq!(config.gpio_root, PathBuf::from("/sys/class/gpio"));
        assert_eq!(config.fan_pin, 18);
        assert!(config.active_low);
    }
}
