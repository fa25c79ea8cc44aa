//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod controller;
pub mod dispatcher;
pub mod fan_service;
pub mod publisher;

#[cfg(test)]
pub(crate) mod test_support;

pub use controller::FanController;
pub use dispatcher::CommandDispatcher;
pub use fan_service::FanService;
pub use publisher::StatePublisher;
