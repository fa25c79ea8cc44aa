//! State publisher: mirrors status updates onto the transport.

use fancontrol_domain::status::{Availability, StatusSnapshot, StatusUpdate};

use crate::ports::Publisher;
use crate::topics::Topics;

/// Maps [`StatusUpdate`]s to topic names and publishes them.
///
/// Publication is best effort: while the transport is down updates are
/// dropped, since a full resync follows every reconnect.
pub struct StatePublisher<P> {
    publisher: P,
    topics: Topics,
}

impl<P: Publisher> StatePublisher<P> {
    pub fn new(publisher: P, topics: Topics) -> Self {
        Self { publisher, topics }
    }

    #[must_use]
    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Publish one update. Returns whether it was handed to the transport.
    pub async fn publish(&self, update: &StatusUpdate) -> bool {
        let topic = self.topics.status(update.topic);
        if !self.publisher.is_connected() {
            tracing::debug!(%topic, "not connected, dropping status update");
            return false;
        }
        match self
            .publisher
            .publish(&topic, &update.payload, update.topic.retained())
            .await
        {
            Ok(()) => {
                tracing::debug!(%topic, payload = %update.payload, "status published");
                true
            }
            Err(err) => {
                tracing::warn!(%topic, error = ?err, "failed to publish status");
                false
            }
        }
    }

    /// Publish updates in order.
    pub async fn publish_all(&self, updates: &[StatusUpdate]) {
        for update in updates {
            self.publish(update).await;
        }
    }

    pub async fn announce(&self, availability: Availability) -> bool {
        self.publish(&StatusUpdate::availability(availability)).await
    }

    /// Announce availability and republish the full state after a connect.
    pub async fn resync(&self, snapshot: StatusSnapshot) {
        self.announce(Availability::Online).await;
        self.publish_all(&snapshot.updates()).await;
        tracing::info!(fan = %snapshot.fan, "state resynchronized");
    }
}
