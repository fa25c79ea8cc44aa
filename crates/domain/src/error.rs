//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`FanControlError`] when crossing a port boundary.

use std::num::ParseFloatError;

/// Boxed error coming from an adapter (hardware, broker client, …).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error shared by the core and its ports.
#[derive(Debug, thiserror::Error)]
pub enum FanControlError {
    /// An inbound message could not be decoded into a command.
    #[error("invalid command")]
    Command(#[from] CommandError),

    /// The sensor or the actuator could not be accessed.
    #[error("hardware error")]
    Hardware(#[source] BoxError),

    /// The pub/sub transport failed.
    #[error("transport error")]
    Transport(#[source] BoxError),
}

/// Reasons an inbound message is dropped.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The topic is not one of the known command topics.
    #[error("unknown command topic {0:?}")]
    UnknownTopic(String),

    /// The payload is not a command word accepted on that topic.
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    /// A numeric command received something that is not a finite number.
    #[error("invalid numeric payload {payload:?}")]
    InvalidNumber {
        payload: String,
        #[source]
        source: Option<ParseFloatError>,
    },

    /// The payload bytes are not valid UTF-8.
    #[error("payload is not valid UTF-8")]
    NotUtf8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_unknown_topic() {
        let err = CommandError::UnknownTopic("foo/bar".to_string());
        assert_eq!(err.to_string(), "unknown command topic \"foo/bar\"");
    }

    #[test]
    fn should_wrap_command_error() {
        let err: FanControlError = CommandError::NotUtf8.into();
        assert!(matches!(err, FanControlError::Command(CommandError::NotUtf8)));
        assert_eq!(err.to_string(), "invalid command");
    }

    #[test]
    fn should_expose_source_of_invalid_number() {
        let source = "abc".parse::<f64>().unwrap_err();
        let err = CommandError::InvalidNumber {
            payload: "abc".to_string(),
            source: Some(source),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
