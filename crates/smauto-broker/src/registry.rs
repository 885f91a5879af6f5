// crates/smauto-broker/src/registry.rs
// ============================================================================
// Module: Broker Registry
// Description: Connects and caches one `Transport` per declared broker.
// Purpose: Entities that share a broker must share a connection
//          (`spec.md` §4.A); the engine looks transports up by name.
// Dependencies: smauto-core, crate::{amqp, error, memory, mqtt, redis,
//               transport}
// ============================================================================

//! ## Overview
//! [`BrokerRegistry::connect_all`] takes the model's broker list, opens
//! exactly one [`Transport`] per [`BrokerName`], and hands back a lookup
//! table the engine uses to resolve each entity's publishes/subscriptions.
//! The system clock entity has no declared broker; engines that need one
//! register a [`MemoryTransport`] under [`smauto_core::SYSTEM_CLOCK_ENTITY`]'s
//! broker name directly via [`BrokerRegistry::insert`].

use std::collections::HashMap;
use std::sync::Arc;

use smauto_core::{Broker, BrokerKind, BrokerName};

use crate::amqp::AmqpTransport;
use crate::error::TransportError;
use crate::memory::MemoryTransport;
use crate::mqtt::MqttTransport;
use crate::redis::RedisTransport;
use crate::transport::Transport;

/// Looks up a live [`Transport`] by the broker name an entity declares.
#[derive(Default)]
pub struct BrokerRegistry {
    transports: HashMap<BrokerName, Arc<dyn Transport>>,
}

impl BrokerRegistry {
    /// Connects a [`Transport`] for every broker in `brokers`, returning the
    /// populated registry. Connection attempts run sequentially since
    /// startup already bounds the number of brokers to a handful. On
    /// failure, returns the name of the broker that failed alongside the
    /// underlying error, so callers can report which one.
    pub async fn connect_all(brokers: &[Broker]) -> Result<Self, (BrokerName, TransportError)> {
        let mut registry = Self::default();
        for broker in brokers {
            let transport = connect(broker)
                .await
                .map_err(|error| (broker.name.clone(), error))?;
            registry.insert(broker.name.clone(), transport);
        }
        Ok(registry)
    }

    /// Registers a transport directly, for the built-in system clock or
    /// for tests that inject a [`MemoryTransport`].
    pub fn insert(&mut self, name: BrokerName, transport: Arc<dyn Transport>) {
        self.transports.insert(name, transport);
    }

    /// Looks up the transport for a broker name.
    #[must_use]
    pub fn get(&self, name: &BrokerName) -> Option<Arc<dyn Transport>> {
        self.transports.get(name).cloned()
    }
}

async fn connect(broker: &Broker) -> Result<Arc<dyn Transport>, TransportError> {
    let port = broker.effective_port();
    match broker.kind {
        BrokerKind::Mqtt => {
            let client_id = format!("smauto-{}", broker.name);
            let transport = MqttTransport::connect(&client_id, &broker.host, port).await?;
            Ok(Arc::new(transport))
        }
        BrokerKind::Amqp => {
            let scheme = if broker.ssl { "amqps" } else { "amqp" };
            let vhost = broker
                .amqp
                .as_ref()
                .map(|extra| extra.vhost.as_str())
                .unwrap_or("/");
            let uri = match &broker.auth {
                Some(auth) => format!(
                    "{scheme}://{}:{}@{}:{port}/{vhost}",
                    auth.username, auth.password, broker.host
                ),
                None => format!("{scheme}://{}:{port}/{vhost}", broker.host),
            };
            let transport = AmqpTransport::connect(&uri).await?;
            Ok(Arc::new(transport))
        }
        BrokerKind::Redis => {
            let scheme = if broker.ssl { "rediss" } else { "redis" };
            let db = broker.redis.map(|extra| extra.db).unwrap_or(0);
            let uri = match &broker.auth {
                Some(auth) => format!(
                    "{scheme}://{}:{}@{}:{port}/{db}",
                    auth.username, auth.password, broker.host
                ),
                None => format!("{scheme}://{}:{port}/{db}", broker.host),
            };
            let transport = RedisTransport::connect(&uri).await?;
            Ok(Arc::new(transport))
        }
        BrokerKind::Memory => Ok(Arc::new(MemoryTransport::new())),
    }
}

/// A registry pre-populated with nothing but an in-memory transport,
/// convenient for tests and for the system clock's own broker.
#[must_use]
pub fn memory_only(name: BrokerName) -> BrokerRegistry {
    let mut registry = BrokerRegistry::default();
    registry.insert(name, Arc::new(MemoryTransport::new()));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_only_registry_resolves_the_named_broker() {
        let name = BrokerName::new("system");
        let registry = memory_only(name.clone());
        assert!(registry.get(&name).is_some());
    }
}
