//! # fancontrol-domain
//!
//! Pure domain model for the fancontrol thermal-protection loop.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, temperature rounding
//! - Define the **threshold pair** and its ordering invariant (`off <= on`)
//! - Define the **fan state** and the **hysteresis** decision function
//! - Define the **exponential smoothing** filter fed by raw sensor samples
//! - Define the inbound **commands** and how payloads decode into them
//! - Define the outbound **status** facets and their payload formatting
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod temperature;

pub mod command;
pub mod fan;
pub mod hysteresis;
pub mod smoothing;
pub mod status;
pub mod threshold;
