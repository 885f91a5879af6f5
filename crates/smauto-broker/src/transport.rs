// crates/smauto-broker/src/transport.rs
// ============================================================================
// Module: Transport Trait
// Description: Backend-agnostic publish/subscribe boundary.
// Purpose: Let `smauto-engine` talk to MQTT/AMQP/Redis/in-memory backends
//          through one interface (`spec.md` §4.A).
// Dependencies: async-trait, serde_json, tokio, smauto-broker::error
// ============================================================================

//! ## Overview
//! [`Transport`] mirrors the reference runtime's broker abstraction: one
//! object per declared broker, subscriptions delivered as a stream of JSON
//! values, and publishes accepting whatever topic the entity declares.
//! [`dot_topic_to_wire`] applies the one wire-format quirk the spec
//! preserves — MQTT topics are `/`-separated on the wire even though the
//! model always writes them dot-separated (`spec.md` §4.A).

use async_trait::async_trait;
use smauto_core::BrokerKind;
use tokio::sync::mpsc;

use crate::error::TransportError;

/// A live connection to a broker, opened once per declared [`smauto_core::Broker`]
/// and shared by every entity bound to it.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publishes `payload` to `topic`.
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), TransportError>;

    /// Subscribes to `topic`, returning a channel that yields every
    /// message received on it. The channel closes if the underlying
    /// connection is dropped; callers resubscribe through a fresh
    /// `Transport` rather than expecting this method to reconnect.
    async fn subscribe(&self, topic: &str) -> Result<mpsc::Receiver<serde_json::Value>, TransportError>;
}

/// Converts a model's dot-separated topic into the wire format a given
/// broker kind expects. Only MQTT rewrites dots to slashes; AMQP routing
/// keys and Redis channels use the topic as declared (`spec.md` §4.A).
#[must_use]
pub fn wire_topic(kind: BrokerKind, topic: &str) -> String {
    match kind {
        BrokerKind::Mqtt => topic.replace('.', "/"),
        BrokerKind::Amqp | BrokerKind::Redis | BrokerKind::Memory => topic.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mqtt_topics_use_slash_separators() {
        assert_eq!(wire_topic(BrokerKind::Mqtt, "sensors.kitchen.temp"), "sensors/kitchen/temp");
    }

    #[test]
    fn amqp_and_redis_topics_are_unchanged() {
        assert_eq!(wire_topic(BrokerKind::Amqp, "sensors.kitchen.temp"), "sensors.kitchen.temp");
        assert_eq!(wire_topic(BrokerKind::Redis, "sensors.kitchen.temp"), "sensors.kitchen.temp");
    }
}
