#![no_std]

//! A decoder and session engine for ANT+ sensor data pages.
//!
//! Chainring turns the 8-byte data pages broadcast by ANT+ devices (power
//! meters, fitness equipment, speed and cadence sensors, heart rate monitors
//! and geocaches) into typed telemetry, recovering totals from wrapping
//! counters and tracking when each device comes and goes.
//!
//! Most users should begin with the [`avec`] module, feeding payloads into a
//! [`Registry`](avec::Registry) or a single [`Session`](avec::Session). The
//! page decoders and command encoders underneath are exposed in the [`sans`]
//! module for applications needing finer control, such as those running on
//! embedded systems.
//!
//! The transport is left to the application: the crate consumes one payload
//! and channel identifier per message, and produces command pages and
//! message envelopes for the application to send.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `std`: enable the concurrent session registry (default).
//! - `serde`: derive `Serialize` and `Deserialize` for configuration and
//!   telemetry.

extern crate alloc;

pub mod avec;
pub mod sans;
