//! # fancontrold: fan control daemon
//!
//! Composition root that wires the hardware and MQTT adapters together and
//! runs the control loop.
//!
//! ## Responsibilities
//! - Parse configuration (CLI argument, env vars, config file)
//! - Initialize logging
//! - Open the hardware backend (sysfs or virtual)
//! - Connect the MQTT transport and start the fan service
//! - Handle graceful shutdown (SIGTERM/SIGINT or an `EXIT` command)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use fancontrol_adapter_mqtt::MqttTransport;
use fancontrol_adapter_sysfs::{GpioFan, ThermalZoneSensor};
use fancontrol_adapter_virtual::VirtualHardware;
use fancontrol_app::ports::{Actuator, TemperatureSource};
use fancontrol_app::services::{FanController, FanService};
use fancontrol_app::shutdown::Shutdown;
use fancontrol_app::topics::Topics;

use crate::config::{Backend, Config};

const EVENT_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FANCONTROL_CONFIG").ok());
    let config = Config::load(path.as_deref())?;

    let filter = EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {:?}: {err}", config.logging.filter);
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = ?config.hardware.backend,
        "starting fancontrold"
    );

    match config.hardware.backend {
        Backend::Sysfs => {
            let sysfs = &config.hardware.sysfs;
            let sensor = ThermalZoneSensor::open(&sysfs.thermal_zone).inspect_err(|err| {
                tracing::error!(error = %err, "cannot open thermal zone");
            })?;
            let fan = GpioFan::open(sysfs).inspect_err(|err| {
                tracing::error!(error = %err, "cannot open fan GPIO");
            })?;
            run(sensor, fan, &config).await?;
        }
        Backend::Virtual => {
            let hardware = VirtualHardware::new(&config.hardware.simulated);
            run(hardware.sensor(), hardware.fan(), &config).await?;
        }
    }
    Ok(())
}

async fn run<S, A>(sensor: S, actuator: A, config: &Config) -> std::io::Result<()>
where
    S: TemperatureSource + 'static,
    A: Actuator + 'static,
{
    let topics = Topics::new(&config.mqtt.base_topic);
    let controller = Arc::new(FanController::from_config(sensor, actuator, &config.control));

    let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);
    let transport = Arc::new(MqttTransport::start(&config.mqtt, &topics, events_tx));

    let mut service = FanService::new(controller, transport, topics, &config.control);
    let shutdown = service.shutdown_handle();
    service.start(events_rx);

    let result = wait_for_exit(&shutdown).await;
    service.stop().await;
    result
}

async fn wait_for_exit(shutdown: &Shutdown) -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        () = shutdown.wait() => tracing::info!("shutdown requested by command"),
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("received SIGINT");
        }
        _ = sigterm.recv() => tracing::info!("received SIGTERM"),
    }
    Ok(())
}
