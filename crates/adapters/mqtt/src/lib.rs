//! # fancontrol-adapter-mqtt
//!
//! MQTT transport: mirrors the fan state to a broker and turns inbound
//! command messages into [`TransportEvent`]s.
//!
//! ## Connection lifecycle
//! - The last-will topic is registered with the broker so that an unclean
//!   disconnect is announced as `OFFLINE`.
//! - Every accepted connection re-subscribes to all command topics and emits
//!   [`TransportEvent::Connected`], which triggers a full state resync.
//! - After a connection error the event loop parks until
//!   [`Transport::reconnect`] is called by the periodic reconnect task.
//!
//! ## Dependency rule
//! Same as other adapters: depends on `fancontrol-app` and `fancontrol-domain`.

pub mod config;
pub mod error;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, LastWill, MqttOptions, Outgoing, Packet, QoS};
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;

use fancontrol_app::ports::{Publisher, Transport, TransportEvent};
use fancontrol_app::topics::Topics;
use fancontrol_domain::error::FanControlError;
use fancontrol_domain::status::{Availability, StatusTopic};

pub use config::MqttConfig;
pub use error::MqttError;

const REQUEST_CAPACITY: usize = 64;
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Default)]
struct ConnectionState {
    connected: AtomicBool,
    stopping: AtomicBool,
    reconnect: Notify,
}

/// Broker connection implementing the [`Transport`] port.
pub struct MqttTransport {
    client: AsyncClient,
    state: Arc<ConnectionState>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl MqttTransport {
    /// Connect to the broker in the background.
    ///
    /// Inbound events are sent to `events`. Must be called from within a
    /// tokio runtime.
    #[must_use]
    pub fn start(config: &MqttConfig, topics: &Topics, events: mpsc::Sender<TransportEvent>) -> Self {
        let options = options(config, topics);
        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let state = Arc::new(ConnectionState::default());

        tracing::info!(
            host = %config.broker_host,
            port = config.broker_port,
            client_id = %config.client_id,
            "connecting to MQTT broker"
        );
        let task = tokio::spawn(run_event_loop(
            eventloop,
            client.clone(),
            topics.subscriptions(),
            Arc::clone(&state),
            events,
        ));

        Self {
            client,
            state,
            task: Mutex::new(Some(task)),
        }
    }
}

/// Build the client options, including the retained `OFFLINE` last will.
fn options(config: &MqttConfig, topics: &Topics) -> MqttOptions {
    let mut options = MqttOptions::new(
        config.client_id.clone(),
        config.broker_host.clone(),
        config.broker_port,
    );
    options.set_keep_alive(config.keep_alive());
    options.set_clean_session(true);
    if let Some((username, password)) = config.credentials() {
        options.set_credentials(username, password);
    }
    options.set_last_will(LastWill::new(
        topics.status(StatusTopic::Lwt),
        Availability::Offline.payload().as_bytes().to_vec(),
        QoS::AtLeastOnce,
        true,
    ));
    options
}

/// Map an inbound packet to a transport event, if it is relevant.
fn incoming_event(packet: &Packet) -> Option<TransportEvent> {
    match packet {
        Packet::Publish(publish) => Some(TransportEvent::Message {
            topic: publish.topic.clone(),
            payload: publish.payload.to_vec(),
        }),
        Packet::Disconnect => Some(TransportEvent::Disconnected {
            reason: "broker closed the connection".to_string(),
        }),
        _ => None,
    }
}

async fn run_event_loop(
    mut eventloop: EventLoop,
    client: AsyncClient,
    subscriptions: Vec<String>,
    state: Arc<ConnectionState>,
    events: mpsc::Sender<TransportEvent>,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                state.connected.store(true, Ordering::SeqCst);
                tracing::info!("connected to MQTT broker");
                // Re-issued on every connect since the session is clean.
                for topic in &subscriptions {
                    if let Err(err) = client.try_subscribe(topic.as_str(), QoS::AtLeastOnce) {
                        tracing::error!(%topic, error = %err, "failed to subscribe");
                    }
                }
                if events.send(TransportEvent::Connected).await.is_err() {
                    break;
                }
            }
            Ok(Event::Incoming(packet)) => {
                let Some(event) = incoming_event(&packet) else {
                    continue;
                };
                if matches!(event, TransportEvent::Disconnected { .. }) {
                    state.connected.store(false, Ordering::SeqCst);
                }
                // Never block the event loop on a slow consumer: publishes
                // issued by that consumer are drained by this loop.
                if let Err(err) = events.try_send(event) {
                    if matches!(err, mpsc::error::TrySendError::Closed(_)) {
                        break;
                    }
                    tracing::warn!("event queue full, dropping inbound message");
                }
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                state.connected.store(false, Ordering::SeqCst);
                tracing::debug!("disconnect sent");
                break;
            }
            Ok(Event::Outgoing(_)) => {}
            Err(err) => {
                let was_connected = state.connected.swap(false, Ordering::SeqCst);
                if state.stopping.load(Ordering::SeqCst) {
                    break;
                }
                if was_connected {
                    tracing::warn!(error = %err, "connection to MQTT broker lost");
                    let reason = err.to_string();
                    if events.send(TransportEvent::Disconnected { reason }).await.is_err() {
                        break;
                    }
                } else {
                    tracing::warn!(error = %err, "could not connect to MQTT broker");
                }
                if !park_until_reconnect(&state).await {
                    break;
                }
                tracing::debug!("retrying MQTT connection");
            }
        }
    }
    tracing::debug!("MQTT event loop stopped");
}

/// Wait for a reconnect request after a connection error.
///
/// Returns `false` when the transport is shutting down instead.
async fn park_until_reconnect(state: &ConnectionState) -> bool {
    if state.stopping.load(Ordering::SeqCst) {
        return false;
    }
    state.reconnect.notified().await;
    !state.stopping.load(Ordering::SeqCst)
}

impl Publisher for MqttTransport {
    fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    async fn publish(&self, topic: &str, payload: &str, retain: bool) -> Result<(), FanControlError> {
        if !self.is_connected() {
            return Err(MqttError::NotConnected.into());
        }
        self.client
            .publish(topic, QoS::AtLeastOnce, retain, payload.as_bytes().to_vec())
            .await
            .map_err(|err| MqttError::Client(err).into())
    }
}

impl Transport for MqttTransport {
    async fn reconnect(&self) -> Result<(), FanControlError> {
        self.state.reconnect.notify_one();
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), FanControlError> {
        self.state.stopping.store(true, Ordering::SeqCst);
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if self.is_connected() {
            if let Err(err) = self.client.disconnect().await {
                tracing::warn!(error = %err, "failed to request disconnect");
            }
        } else {
            self.state.reconnect.notify_one();
        }

        if let Some(mut task) = task
            && tokio::time::timeout(DISCONNECT_TIMEOUT, &mut task).await.is_err()
        {
            tracing::debug!("MQTT event loop did not stop in time, aborting");
            task.abort();
        }
        tracing::info!("disconnected from MQTT broker");
        Ok(())
    }
}
