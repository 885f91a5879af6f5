// system-tests/src/lib.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared model-building and polling helpers for the end-to-end
//              scenarios in `system-tests/tests`.
// Purpose: Keep each scenario file focused on the behavior it demonstrates
//          rather than on boilerplate model construction.
// Dependencies: smauto-core, smauto-engine, tokio
// ============================================================================

//! ## Overview
//! Every scenario in `spec.md` §8 runs the real `smauto-engine::Engine`
//! against a [`smauto_core::BrokerKind::Memory`] broker, so no network or
//! external process is needed. [`poll_until`] stands in for the "expect
//! within N seconds" language the scenarios use, since the engine's state
//! transitions happen on its own tasks rather than synchronously.

use std::time::Duration;

use smauto_core::{Attribute, AttributeKind, Broker, BrokerKind, Entity, EntityKind};

/// Builds a single in-memory broker declaration named `name`.
#[must_use]
pub fn memory_broker(name: &str) -> Broker {
    Broker {
        name: name.into(),
        kind: BrokerKind::Memory,
        host: String::new(),
        port: None,
        auth: None,
        ssl: false,
        amqp: None,
        redis: None,
    }
}

/// Builds an entity bound to `broker` with the given attributes.
#[must_use]
pub fn entity(name: &str, kind: EntityKind, broker: &str, topic: &str, attributes: Vec<Attribute>) -> Entity {
    Entity {
        name: name.into(),
        kind,
        broker: broker.into(),
        topic: topic.to_string(),
        attributes,
    }
}

/// Shorthand for a single bool/int/float/string attribute declared at its
/// kind's default value.
#[must_use]
pub fn attr(name: &str, kind: AttributeKind) -> Attribute {
    Attribute::new(name, kind)
}

/// Polls `predicate` every `interval` until it returns `true` or `timeout`
/// elapses, returning whether it succeeded. Used for the scenarios' "expect
/// within N seconds" assertions against state that changes on background
/// engine tasks.
pub async fn poll_until<F>(timeout: Duration, interval: Duration, mut predicate: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if predicate() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(interval).await;
    }
}
