//! In-memory fakes shared by the service tests.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use fancontrol_domain::error::FanControlError;
use fancontrol_domain::fan::FanState;
use fancontrol_domain::temperature::Celsius;
use fancontrol_domain::threshold::{BoundLimits, ThresholdLimits};

use crate::ports::{Actuator, Publisher, TemperatureSource, Transport};

/// Limits against a 100 °C maximum, so percentages equal degrees.
pub fn thresholds(on: Celsius, off: Celsius) -> ThresholdLimits {
    ThresholdLimits {
        max_temperature: 100.0,
        on: BoundLimits::new(on, 50.0, 95.0),
        off: BoundLimits::new(off, 40.0, 75.0),
    }
}

#[derive(Clone)]
pub struct FakeSensor {
    reading: Arc<Mutex<Option<Celsius>>>,
}

impl Default for FakeSensor {
    fn default() -> Self {
        Self {
            reading: Arc::new(Mutex::new(Some(20.0))),
        }
    }
}

impl FakeSensor {
    pub fn set(&self, value: Celsius) {
        *self.reading.lock().unwrap() = Some(value);
    }

    pub fn fail(&self) {
        *self.reading.lock().unwrap() = None;
    }
}

impl TemperatureSource for FakeSensor {
    fn read(&self) -> impl Future<Output = Result<Celsius, FanControlError>> + Send {
        let reading = *self.reading.lock().unwrap();
        async move { reading.ok_or_else(|| FanControlError::Hardware("sensor unavailable".into())) }
    }
}

#[derive(Default)]
struct FanInner {
    state: FanState,
    writes: u32,
    failing: bool,
}

#[derive(Clone, Default)]
pub struct FakeFan {
    inner: Arc<Mutex<FanInner>>,
}

impl FakeFan {
    /// Set the output without counting a write.
    pub fn preset(&self, state: FanState) {
        self.inner.lock().unwrap().state = state;
    }

    pub fn fail_writes(&self, failing: bool) {
        self.inner.lock().unwrap().failing = failing;
    }

    pub fn writes(&self) -> u32 {
        self.inner.lock().unwrap().writes
    }

    pub fn state(&self) -> FanState {
        self.inner.lock().unwrap().state
    }
}

impl Actuator for FakeFan {
    fn write(&mut self, state: FanState) -> Result<(), FanControlError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failing {
            return Err(FanControlError::Hardware("gpio write failed".into()));
        }
        inner.state = state;
        inner.writes += 1;
        Ok(())
    }

    fn read(&self) -> Result<FanState, FanControlError> {
        Ok(self.inner.lock().unwrap().state)
    }
}

/// A published message: topic, payload, retain flag.
pub type Published = (String, String, bool);

#[derive(Default)]
pub struct RecordingTransport {
    connected: AtomicBool,
    published: Mutex<Vec<Published>>,
    reconnects: AtomicU32,
    disconnects: AtomicU32,
    failing_publishes: AtomicBool,
    failing_reconnects: AtomicBool,
}

impl RecordingTransport {
    pub fn connected() -> Self {
        let transport = Self::default();
        transport.set_connected(true);
        transport
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }

    pub fn published_on(&self, topic: &str) -> Vec<String> {
        self.published()
            .into_iter()
            .filter(|(t, _, _)| t == topic)
            .map(|(_, payload, _)| payload)
            .collect()
    }

    pub fn clear(&self) {
        self.published.lock().unwrap().clear();
    }

    pub fn fail_publishes(&self, failing: bool) {
        self.failing_publishes.store(failing, Ordering::SeqCst);
    }

    pub fn fail_reconnects(&self, failing: bool) {
        self.failing_reconnects.store(failing, Ordering::SeqCst);
    }

    pub fn reconnects(&self) -> u32 {
        self.reconnects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> u32 {
        self.disconnects.load(Ordering::SeqCst)
    }
}

impl Publisher for RecordingTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn publish(
        &self,
        topic: &str,
        payload: &str,
        retain: bool,
    ) -> impl Future<Output = Result<(), FanControlError>> + Send {
        let result = if self.failing_publishes.load(Ordering::SeqCst) {
            Err(FanControlError::Transport("broker rejected publish".into()))
        } else {
            self.published
                .lock()
                .unwrap()
                .push((topic.to_string(), payload.to_string(), retain));
            Ok(())
        };
        async move { result }
    }
}

impl Transport for RecordingTransport {
    fn reconnect(&self) -> impl Future<Output = Result<(), FanControlError>> + Send {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        let result = if self.failing_reconnects.load(Ordering::SeqCst) {
            Err(FanControlError::Transport("broker unreachable".into()))
        } else {
            Ok(())
        };
        async move { result }
    }

    fn disconnect(&self) -> impl Future<Output = Result<(), FanControlError>> + Send {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.set_connected(false);
        async { Ok(()) }
    }
}
