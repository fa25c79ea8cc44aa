//! MQTT transport configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the MQTT transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Optional broker credentials.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Base topic prefix for all command and status topics.
    pub base_topic: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "fancontrol".to_string(),
            username: None,
            password: None,
            base_topic: "fancontrol".to_string(),
            keep_alive_secs: 30,
        }
    }
}

impl MqttConfig {
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(u64::from(self.keep_alive_secs.max(5)))
    }

    /// Username and password, when both are configured.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            (Some(user), None) => Some((user.as_str(), "")),
            _ => None,
        }
    }
}
