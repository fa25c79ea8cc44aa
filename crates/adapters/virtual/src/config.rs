//! Virtual hardware configuration.

use serde::Deserialize;

use fancontrol_domain::temperature::Celsius;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VirtualConfig {
    pub initial_temperature: Celsius,
    /// Floor reached while the fan runs.
    pub ambient_temperature: Celsius,
    /// Rated maximum reported to the controller, also the heating ceiling.
    pub max_temperature: Option<Celsius>,
    /// Degrees gained per read while the fan is idle.
    pub heat_rate: f64,
    /// Degrees lost per read while the fan runs.
    pub cool_rate: f64,
}

impl Default for VirtualConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 45.0,
            ambient_temperature: 35.0,
            max_temperature: Some(75.0),
            heat_rate: 0.5,
            cool_rate: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r"
            initial_temperature = 60.0
            heat_rate = 1.5
        ";
        let config: VirtualConfig = toml::from_str(toml).unwrap();
        assert!((config.initial_temperature - 60.0).abs() < f64::EPSILON);
        assert!((config.heat_rate - 1.5).abs() < f64::EPSILON);
        assert!((config.cool_rate - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.max_temperature, Some(75.0));
    }
}
