//! # fancontrol-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `TemperatureSource`: read the SoC temperature
//!   - `Actuator`: drive and read back the fan output
//!   - `Publisher` / `Transport`: publish status, reconnect, disconnect
//! - Own the shared control state behind a single lock (`FanController`)
//! - Run the periodic sampling, publication and reconnect tasks (`Scheduler`)
//! - Decode and apply inbound commands (`CommandDispatcher`)
//! - Drive the process lifecycle and shutdown sequence (`FanService`)
//!
//! ## Dependency rule
//! Depends on `fancontrol-domain` only (plus `tokio` for tasks and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod scheduler;
pub mod services;
pub mod settings;
pub mod shutdown;
pub mod topics;
