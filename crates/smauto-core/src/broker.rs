// crates/smauto-core/src/broker.rs
// ============================================================================
// Module: SmAuto Broker Configuration
// Description: Broker connection configuration (`spec.md` §3, §6).
// Purpose: Describe how to reach an MQTT/AMQP/Redis broker, independent of
//          the transport implementation that connects to it.
// Dependencies: crate::identifiers, serde
// ============================================================================

//! ## Overview
//! [`Broker`] is pure configuration: kind, host/port, optional auth, TLS,
//! and kind-specific extras. `smauto-broker` turns a `Broker` into a live
//! `Transport`; this crate never opens a socket.

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::BrokerName;

/// Broker backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokerKind {
    /// MQTT broker.
    Mqtt,
    /// AMQP (e.g. RabbitMQ) broker.
    Amqp,
    /// Redis pub/sub.
    Redis,
    /// In-process transport. Never produced by a real deployment's model
    /// file; used by the built-in system clock and by tests that want a
    /// real `Engine::bootstrap` run without a network broker.
    Memory,
}

/// Plaintext username/password credentials. Empty values are permitted
/// (`spec.md` §4.A: "empty user/pass permitted for MQTT, anonymous where
/// the broker allows").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerAuth {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// AMQP-specific configuration (`spec.md` §6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmqpExtra {
    /// Virtual host.
    pub vhost: String,
    /// Topic exchange name. Defaults to `amq.topic`.
    #[serde(default = "default_topic_exchange")]
    pub topic_exchange: String,
    /// RPC exchange name. Defaults to `DEFAULT`.
    #[serde(default = "default_rpc_exchange")]
    pub rpc_exchange: String,
}

fn default_topic_exchange() -> String {
    "amq.topic".to_string()
}

fn default_rpc_exchange() -> String {
    "DEFAULT".to_string()
}

/// Redis-specific configuration (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisExtra {
    /// Database index. Defaults to 0.
    #[serde(default)]
    pub db: u32,
}

/// A declared broker: kind, address, auth, and kind-specific extras.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broker {
    /// Stable broker name, unique model-wide.
    pub name: BrokerName,
    /// Backend kind.
    pub kind: BrokerKind,
    /// Broker host.
    pub host: String,
    /// Broker port. Defaults to the kind's standard port when omitted.
    pub port: Option<u16>,
    /// Optional plaintext credentials.
    #[serde(default)]
    pub auth: Option<BrokerAuth>,
    /// Whether to use TLS.
    #[serde(default)]
    pub ssl: bool,
    /// AMQP-only extras. `None` for non-AMQP brokers.
    #[serde(default)]
    pub amqp: Option<AmqpExtra>,
    /// Redis-only extras. `None` for non-Redis brokers.
    #[serde(default)]
    pub redis: Option<RedisExtra>,
}

impl Broker {
    /// Resolves the effective port, applying the kind's default
    /// (`spec.md` §6: MQTT 1883, Redis 6379; AMQP has no universal default
    /// in the spec so `5672` is used, the protocol's registered port).
    #[must_use]
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(match self.kind {
            BrokerKind::Mqtt => 1883,
            BrokerKind::Amqp => 5672,
            BrokerKind::Redis => 6379,
            BrokerKind::Memory => 0,
        })
    }
}
