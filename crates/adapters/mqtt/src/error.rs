//! MQTT adapter error types.

use fancontrol_domain::error::FanControlError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// No live broker connection.
    #[error("MQTT client not connected")]
    NotConnected,

    /// The rumqttc client returned an error.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),
}

impl MqttError {
    /// Convert into a [`FanControlError::Transport`] for propagation across
    /// port boundaries.
    #[must_use]
    pub fn into_domain(self) -> FanControlError {
        FanControlError::Transport(Box::new(self))
    }
}

impl From<MqttError> for FanControlError {
    fn from(err: MqttError) -> Self {
        err.into_domain()
    }
}
