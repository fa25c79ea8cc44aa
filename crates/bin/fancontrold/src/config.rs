//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `fancontrol.toml` in the working directory unless another path
//! is given. Every field has a sensible default so the default file is
//! optional. Environment variables take precedence over file values.

use std::path::Path;

use serde::Deserialize;

use fancontrol_adapter_mqtt::MqttConfig;
use fancontrol_adapter_sysfs::SysfsConfig;
use fancontrol_adapter_virtual::VirtualConfig;
use fancontrol_app::settings::ControlConfig;

const DEFAULT_PATH: &str = "fancontrol.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Broker connection and topic base.
    pub mqtt: MqttConfig,
    /// Sensor and fan backend.
    pub hardware: HardwareConfig,
    /// Thresholds, smoothing, timers and exit policy.
    pub control: ControlConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "fancontrold=info,fancontrol=info".to_string(),
        }
    }
}

/// Which hardware the daemon drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Linux thermal zone and sysfs GPIO.
    #[default]
    Sysfs,
    /// Simulated board.
    Virtual,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    pub backend: Backend,
    pub sysfs: SysfsConfig,
    #[serde(rename = "virtual")]
    pub simulated: VirtualConfig,
}

impl Config {
    /// Load configuration from `path` (or `fancontrol.toml` when `None`)
    /// then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed, if an explicitly given
    /// file cannot be read, or if validation fails.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path, true)?,
            None => Self::from_file(DEFAULT_PATH, false)?,
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: impl AsRef<Path>, required: bool) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("FANCONTROL_MQTT_HOST") {
            self.mqtt.broker_host = val;
        }
        if let Some(val) = lookup("FANCONTROL_MQTT_PORT")
            && let Ok(port) = val.parse()
        {
            self.mqtt.broker_port = port;
        }
        if let Some(val) = lookup("FANCONTROL_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.broker_port == 0 {
            return Err(ConfigError::Validation(
                "mqtt.broker_port must be non-zero".to_string(),
            ));
        }
        let client_id = &self.mqtt.client_id;
        if client_id.is_empty() || client_id.starts_with(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "mqtt.client_id must not be empty or start with whitespace".to_string(),
            ));
        }
        if self.mqtt.base_topic.trim_matches('/').is_empty() {
            return Err(ConfigError::Validation(
                "mqtt.base_topic must not be empty".to_string(),
            ));
        }
        let thresholds = &self.control.thresholds;
        for (name, bound) in [("on", &thresholds.on), ("off", &thresholds.off)] {
            let values = [bound.default, bound.min, bound.max];
            if values.into_iter().flatten().any(|value| !value.is_finite()) {
                return Err(ConfigError::Validation(format!(
                    "control.thresholds.{name} values must be finite"
                )));
            }
        }
        let max = thresholds.max_temperature;
        if !max.is_finite() || max <= 0.0 {
            return Err(ConfigError::Validation(
                "control.thresholds.max_temperature must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
