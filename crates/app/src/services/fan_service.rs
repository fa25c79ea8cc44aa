//! Fan service: wires the controller, scheduler and dispatcher together
//! and owns the process lifecycle.
//!
//! Two periodic tasks run independently:
//! - **sampling**: reads the sensor every measure period, publishes the
//!   smoothed temperature every `publish_prescale` samples and evaluates
//!   the hysteresis every `trigger_prescale` samples;
//! - **reconnect**: asks the transport to reconnect whenever it is down.
//!
//! Transport events are consumed by a third task until shutdown.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use fancontrol_domain::status::{Availability, StatusUpdate};

use crate::ports::{Actuator, Publisher, TemperatureSource, Transport, TransportEvent};
use crate::scheduler::{PeriodicTask, Scheduler, task_fn};
use crate::services::controller::FanController;
use crate::services::dispatcher::CommandDispatcher;
use crate::services::publisher::StatePublisher;
use crate::settings::{ControlConfig, ExitPolicy};
use crate::shutdown::Shutdown;
use crate::topics::Topics;

pub struct FanService<S, A, T> {
    controller: Arc<FanController<S, A>>,
    transport: Arc<T>,
    publisher: Arc<StatePublisher<Arc<T>>>,
    dispatcher: Arc<CommandDispatcher<S, A, Arc<T>>>,
    scheduler: Scheduler,
    shutdown: Shutdown,
    on_exit: ExitPolicy,
    events: Option<JoinHandle<()>>,
}

impl<S, A, T> FanService<S, A, T>
where
    S: TemperatureSource + 'static,
    A: Actuator + 'static,
    T: Transport + 'static,
{
    pub fn new(
        controller: Arc<FanController<S, A>>,
        transport: Arc<T>,
        topics: Topics,
        config: &ControlConfig,
    ) -> Self {
        let shutdown = Shutdown::new();
        let publisher = Arc::new(StatePublisher::new(Arc::clone(&transport), topics));
        let dispatcher = Arc::new(CommandDispatcher::new(
            Arc::clone(&controller),
            Arc::clone(&publisher),
            shutdown.clone(),
        ));

        let mut scheduler = Scheduler::new();
        scheduler.register(sampling_task(&controller, &publisher, config));
        scheduler.register(reconnect_task(&transport, config));

        Self {
            controller,
            transport,
            publisher,
            dispatcher,
            scheduler,
            shutdown,
            on_exit: config.on_exit,
            events: None,
        }
    }

    /// Handle used to request shutdown from outside (signals) or wait for
    /// one requested by a command.
    #[must_use]
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    #[must_use]
    pub fn controller(&self) -> &Arc<FanController<S, A>> {
        &self.controller
    }

    /// Start the periodic tasks and consume `events` until shutdown.
    pub fn start(&mut self, mut events: mpsc::Receiver<TransportEvent>) {
        if self.events.is_some() {
            tracing::debug!("fan service already started");
            return;
        }
        self.scheduler.start();

        let dispatcher = Arc::clone(&self.dispatcher);
        let shutdown = self.shutdown.clone();
        self.events = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = shutdown.wait() => break,
                    event = events.recv() => match event {
                        Some(event) => dispatcher.handle(event).await,
                        None => {
                            tracing::warn!("transport event channel closed");
                            break;
                        }
                    },
                }
            }
            tracing::debug!("event loop stopped");
        }));
        tracing::info!("fan service started");
    }

    /// Stop every task, apply the exit policy, go offline and disconnect.
    pub async fn stop(&mut self) {
        self.shutdown.trigger();
        self.scheduler.stop().await;
        if let Some(handle) = self.events.take()
            && let Err(err) = handle.await
        {
            tracing::error!(error = %err, "event loop ended abnormally");
        }

        if self.on_exit == ExitPolicy::Off
            && let Some(update) = self.controller.force_off()
        {
            self.publisher.publish(&update).await;
        }
        self.publisher.announce(Availability::Offline).await;
        if let Err(err) = self.transport.disconnect().await {
            tracing::warn!(error = ?err, "failed to disconnect transport");
        }
        tracing::info!(fan = %self.controller.fan_state(), "fan service stopped");
    }
}

fn sampling_task<S, A, P>(
    controller: &Arc<FanController<S, A>>,
    publisher: &Arc<StatePublisher<P>>,
    config: &ControlConfig,
) -> PeriodicTask
where
    S: TemperatureSource + 'static,
    A: Actuator + 'static,
    P: Publisher + 'static,
{
    let sample = {
        let controller = Arc::clone(controller);
        task_fn(move || {
            let controller = Arc::clone(&controller);
            async move {
                match controller.sample().await {
                    Ok(sample) => tracing::debug!(
                        raw = sample.raw,
                        smoothed = sample.smoothed,
                        taken_at = %sample.taken_at,
                        "temperature sampled"
                    ),
                    Err(err) => tracing::warn!(error = ?err, "temperature read failed"),
                }
            }
        })
    };
    let publish_temperature = {
        let controller = Arc::clone(controller);
        let publisher = Arc::clone(publisher);
        task_fn(move || {
            let controller = Arc::clone(&controller);
            let publisher = Arc::clone(&publisher);
            async move {
                if let Some(temperature) = controller.temperature() {
                    publisher
                        .publish(&StatusUpdate::temperature(temperature))
                        .await;
                }
            }
        })
    };
    let evaluate = {
        let controller = Arc::clone(controller);
        let publisher = Arc::clone(publisher);
        task_fn(move || {
            let controller = Arc::clone(&controller);
            let publisher = Arc::clone(&publisher);
            async move {
                if let Some(update) = controller.evaluate() {
                    publisher.publish(&update).await;
                }
            }
        })
    };

    let timers = &config.timers;
    PeriodicTask::new("sampling", timers.measure_period(), sample)
        .with_prescaler(timers.publish_prescale(), publish_temperature)
        .with_prescaler(timers.trigger_prescale(), evaluate)
}

fn reconnect_task<T: Transport + 'static>(transport: &Arc<T>, config: &ControlConfig) -> PeriodicTask {
    let transport = Arc::clone(transport);
    PeriodicTask::new(
        "reconnect",
        config.timers.reconnect_period(),
        task_fn(move || {
            let transport = Arc::clone(&transport);
            async move {
                if transport.is_connected() {
                    return;
                }
                tracing::info!("transport down, reconnecting");
                if let Err(err) = transport.reconnect().await {
                    tracing::warn!(error = ?err, "reconnect failed");
                }
            }
        }),
    )
}
