//! Transport port: the pub/sub channel status is mirrored to and commands
//! arrive from.
//!
//! Inbound traffic is delivered as [`TransportEvent`]s over a channel the
//! adapter is given at construction; outbound traffic goes through
//! [`Publisher`].

use std::future::Future;

use fancontrol_domain::error::FanControlError;

/// Something that happened on the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The broker accepted the connection (first connect or reconnect).
    Connected,
    /// The connection was lost.
    Disconnected { reason: String },
    /// A message arrived on a subscribed topic.
    Message { topic: String, payload: Vec<u8> },
}

/// Publishes messages to the broker.
pub trait Publisher: Send + Sync {
    /// Whether the transport currently holds a live connection.
    fn is_connected(&self) -> bool;

    /// Publish `payload` on `topic`.
    fn publish(
        &self,
        topic: &str,
        payload: &str,
        retain: bool,
    ) -> impl Future<Output = Result<(), FanControlError>> + Send;
}

/// Connection management on top of [`Publisher`].
pub trait Transport: Publisher {
    /// Ask the transport to try connecting again.
    fn reconnect(&self) -> impl Future<Output = Result<(), FanControlError>> + Send;

    /// Disconnect gracefully, flushing queued messages when possible.
    fn disconnect(&self) -> impl Future<Output = Result<(), FanControlError>> + Send;
}

impl<T: Publisher> Publisher for std::sync::Arc<T> {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn publish(
        &self,
        topic: &str,
        payload: &str,
        retain: bool,
    ) -> impl Future<Output = Result<(), FanControlError>> + Send {
        (**self).publish(topic, payload, retain)
    }
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn reconnect(&self) -> impl Future<Output = Result<(), FanControlError>> + Send {
        (**self).reconnect()
    }

    fn disconnect(&self) -> impl Future<Output = Result<(), FanControlError>> + Send {
        (**self).disconnect()
    }
}
