// crates/smauto-broker/src/lib.rs
// ============================================================================
// Crate: smauto-broker
// Description: Live broker connections for MQTT/AMQP/Redis plus an
//              in-memory transport for the system clock and tests.
// Purpose: Give `smauto-engine` one `Transport` interface over every
//          broker kind the model can declare (`spec.md` §4.A).
// Dependencies: smauto-core, async-trait, lapin, redis, rumqttc, tokio
// ============================================================================

//! ## Overview
//!
//! `smauto-broker` turns a [`smauto_core::Broker`] configuration into a
//! live connection. [`Transport`] is the interface the engine programs
//! against; [`BrokerRegistry`] connects and caches one per declared
//! broker. [`MemoryTransport`] backs the built-in system clock and the
//! `system-tests` crate's end-to-end scenarios, needing no external
//! broker process.

mod amqp;
mod backoff;
mod error;
mod memory;
mod mqtt;
mod redis;
mod registry;
mod transport;

pub use backoff::Backoff;
pub use error::TransportError;
pub use memory::MemoryTransport;
pub use registry::{memory_only, BrokerRegistry};
pub use transport::{wire_topic, Transport};
