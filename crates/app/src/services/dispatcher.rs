//! Command dispatcher: routes transport events into the controller.

use std::sync::Arc;

use fancontrol_domain::command::Command;
use fancontrol_domain::error::CommandError;

use crate::ports::{Actuator, Publisher, TemperatureSource, TransportEvent};
use crate::services::controller::FanController;
use crate::services::publisher::StatePublisher;
use crate::shutdown::Shutdown;

pub struct CommandDispatcher<S, A, P> {
    controller: Arc<FanController<S, A>>,
    publisher: Arc<StatePublisher<P>>,
    shutdown: Shutdown,
}

impl<S, A, P> CommandDispatcher<S, A, P>
where
    S: TemperatureSource,
    A: Actuator,
    P: Publisher,
{
    pub fn new(
        controller: Arc<FanController<S, A>>,
        publisher: Arc<StatePublisher<P>>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            controller,
            publisher,
            shutdown,
        }
    }

    /// React to one transport event.
    pub async fn handle(&self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                tracing::info!("transport connected");
                let snapshot = self.controller.snapshot();
                self.publisher.resync(snapshot).await;
            }
            TransportEvent::Disconnected { reason } => {
                tracing::warn!(%reason, "transport disconnected");
            }
            TransportEvent::Message { topic, payload } => {
                self.dispatch(&topic, &payload).await;
            }
        }
    }

    /// Decode and apply an inbound message.
    ///
    /// Malformed messages are logged and dropped. Returns the command that
    /// was applied.
    pub async fn dispatch(&self, topic: &str, payload: &[u8]) -> Option<Command> {
        let command = match self.decode(topic, payload) {
            Ok(command) => command,
            Err(err) => {
                tracing::warn!(%topic, error = %err, "dropping inbound message");
                return None;
            }
        };
        tracing::debug!(%topic, ?command, "command received");

        if command == Command::Exit {
            tracing::info!("exit requested");
            self.shutdown.trigger();
            return Some(command);
        }
        let updates = self.controller.apply(command);
        self.publisher.publish_all(&updates).await;
        Some(command)
    }

    fn decode(&self, topic: &str, payload: &[u8]) -> Result<Command, CommandError> {
        let role = self
            .publisher
            .topics()
            .command(topic)
            .ok_or_else(|| CommandError::UnknownTopic(topic.to_string()))?;
        Command::decode(role, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{FakeFan, FakeSensor, RecordingTransport, thresholds};
    use crate::topics::Topics;
    use fancontrol_domain::fan::FanState;
    use fancontrol_domain::smoothing::ExponentialFilter;
    use fancontrol_domain::threshold::ThresholdStore;

    struct Harness {
        fan: FakeFan,
        transport: Arc<RecordingTransport>,
        shutdown: Shutdown,
        dispatcher: CommandDispatcher<FakeSensor, FakeFan, Arc<RecordingTransport>>,
    }

    fn harness() -> Harness {
        let fan = FakeFan::default();
        let transport = Arc::new(RecordingTransport::connected());
        let shutdown = Shutdown::new();
        let controller = Arc::new(FanController::new(
            FakeSensor::default(),
            fan.clone(),
            ThresholdStore::new(thresholds(80.0, 60.0)),
            ExponentialFilter::default(),
        ));
        let publisher = Arc::new(StatePublisher::new(
            Arc::clone(&transport),
            Topics::new("fan"),
        ));
        Harness {
            fan,
            transport: Arc::clone(&transport),
            shutdown: shutdown.clone(),
            dispatcher: CommandDispatcher::new(controller, publisher, shutdown),
        }
    }

    #[tokio::test]
    async fn should_switch_fan_and_publish() {
        let h = harness();
        let command = h.dispatcher.dispatch("fan/command/fan", b"ON").await;
        assert_eq!(command, Some(Command::SetOn));
        assert_eq!(h.fan.state(), FanState::On);
        assert_eq!(h.transport.published_on("fan/status/fan"), vec!["ACTIVE"]);
    }

    #[tokio::test]
    async fn should_not_write_or_publish_redundant_on() {
        let h = harness();
        h.dispatcher.dispatch("fan/command/fan", b"ON").await;
        h.transport.clear();
        h.dispatcher.dispatch("fan/command/fan", b"on").await;
        assert_eq!(h.fan.writes(), 1);
        assert!(h.transport.published().is_empty());
    }

    #[tokio::test]
    async fn should_publish_four_facets_after_threshold_change() {
        let h = harness();
        h.dispatcher.dispatch("fan/command/percent-on", b"90").await;
        assert_eq!(h.transport.published().len(), 4);
        assert_eq!(h.transport.published_on("fan/status/percent-on"), vec!["90"]);
        assert_eq!(h.transport.published_on("fan/status/temp-on"), vec!["90"]);
    }

    #[tokio::test]
    async fn should_keep_applied_changes_when_publish_fails() {
        let h = harness();
        h.transport.fail_publishes(true);

        let command = h.dispatcher.dispatch("fan/command/fan", b"ON").await;
        assert_eq!(command, Some(Command::SetOn));
        let command = h.dispatcher.dispatch("fan/command/temp-on", b"90").await;
        assert_eq!(command, Some(Command::SetTempOn(90.0)));

        assert_eq!(h.fan.state(), FanState::On);
        assert_eq!(h.fan.writes(), 1);
        let thresholds = h.dispatcher.controller.thresholds();
        assert!((thresholds.on - 90.0).abs() < 1e-9);
        assert!((thresholds.off - 60.0).abs() < 1e-9);
        assert!(h.transport.published().is_empty());
    }

    #[tokio::test]
    async fn should_drop_unknown_topic() {
        let h = harness();
        assert_eq!(h.dispatcher.dispatch("fan/command/speed", b"ON").await, None);
        assert_eq!(h.dispatcher.dispatch("other/command/fan", b"ON").await, None);
        assert_eq!(h.fan.writes(), 0);
        assert!(h.transport.published().is_empty());
    }

    #[tokio::test]
    async fn should_drop_malformed_payload() {
        let h = harness();
        assert_eq!(h.dispatcher.dispatch("fan/command/temp-on", b"warm").await, None);
        assert_eq!(h.dispatcher.dispatch("fan/command/fan", b"SPIN").await, None);
        assert!(h.transport.published().is_empty());
    }

    #[tokio::test]
    async fn should_trigger_shutdown_on_exit() {
        let h = harness();
        assert_eq!(
            h.dispatcher.dispatch("fan/command/script", b"EXIT").await,
            Some(Command::Exit)
        );
        assert!(h.shutdown.is_triggered());
        assert_eq!(h.fan.writes(), 0);
    }

    #[tokio::test]
    async fn should_resync_on_connect() {
        let h = harness();
        h.dispatcher.handle(TransportEvent::Connected).await;
        assert_eq!(h.transport.published().len(), 6);
        assert_eq!(h.transport.published_on("fan/status/lwt"), vec!["ONLINE"]);
        assert_eq!(h.transport.published_on("fan/status/fan"), vec!["IDLE"]);
    }

    #[tokio::test]
    async fn should_route_messages_from_events() {
        let h = harness();
        h.dispatcher
            .handle(TransportEvent::Message {
                topic: "fan/command/fan".to_string(),
                payload: b"TOGGLE".to_vec(),
            })
            .await;
        assert_eq!(h.fan.state(), FanState::On);
    }

    #[tokio::test]
    async fn should_ignore_disconnect_event() {
        let h = harness();
        h.dispatcher
            .handle(TransportEvent::Disconnected {
                reason: "broker gone".to_string(),
            })
            .await;
        assert!(h.transport.published().is_empty());
        assert!(!h.shutdown.is_triggered());
    }
}
