// crates/smauto-broker/src/mqtt.rs
// ============================================================================
// Module: MQTT Transport
// Description: A `Transport` backed by `rumqttc`.
// Purpose: Connect to the MQTT brokers SmAuto entities are most commonly
//          bound to (`spec.md` §4.A).
// Dependencies: async-trait, rumqttc, serde_json, tokio, tracing,
//               crate::{backoff, error, transport}
// ============================================================================

//! ## Overview
//! [`MqttTransport`] wraps a `rumqttc::AsyncClient` plus its `EventLoop`.
//! The event loop is polled on a background task for the lifetime of the
//! transport; `publish`/`subscribe` only ever touch the client handle, which
//! is cheap to clone. A dropped connection is retried with [`Backoff`]
//! rather than surfaced to callers — matching how the reference runtime's
//! broker clients reconnect silently under transient network loss.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::{mpsc, Mutex};

use crate::backoff::Backoff;
use crate::error::TransportError;
use crate::transport::Transport;

/// A live MQTT connection, one per declared broker.
pub struct MqttTransport {
    client: AsyncClient,
    /// Fan-out registry: topic -> senders waiting on messages for it.
    subscribers: Arc<Mutex<Vec<(String, mpsc::Sender<serde_json::Value>)>>>,
}

impl MqttTransport {
    /// Connects to `host:port`, spawning a background task that drives the
    /// event loop and forwards incoming publishes to matching subscribers.
    pub async fn connect(client_id: &str, host: &str, port: u16) -> Result<Self, TransportError> {
        let mut options = MqttOptions::new(client_id, host, port);
        options.set_keep_alive(Duration::from_secs(30));
        let (client, mut event_loop) = AsyncClient::new(options, 64);

        let subscribers: Arc<Mutex<Vec<(String, mpsc::Sender<serde_json::Value>)>>> =
            Arc::new(Mutex::new(Vec::new()));
        let loop_subscribers = Arc::clone(&subscribers);

        tokio::spawn(async move {
            let mut backoff = Backoff::default();
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        backoff.reset();
                        let topic = publish.topic.replace('/', ".");
                        let value: serde_json::Value =
                            match serde_json::from_slice(&publish.payload) {
                                Ok(value) => value,
                                Err(error) => {
                                    tracing::warn!(%topic, %error, "dropping malformed MQTT payload");
                                    continue;
                                }
                            };
                        let mut guard = loop_subscribers.lock().await;
                        guard.retain(|(sub_topic, tx)| {
                            sub_topic != &topic || tx.try_send(value.clone()).is_ok()
                        });
                    }
                    Ok(_) => backoff.reset(),
                    Err(error) => {
                        let delay = backoff.next_delay();
                        tracing::warn!(%error, ?delay, "MQTT event loop error, reconnecting");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        });

        Ok(Self { client, subscribers })
    }
}

#[async_trait]
impl Transport for MqttTransport {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), TransportError> {
        let wire_topic = topic.replace('.', "/");
        let bytes = serde_json::to_vec(&payload)
            .map_err(|error| TransportError::Publish(error.to_string()))?;
        self.client
            .publish(wire_topic, QoS::AtLeastOnce, false, bytes)
            .await
            .map_err(|error| TransportError::Publish(error.to_string()))
    }

    async fn subscribe(&self, topic: &str) -> Result<mpsc::Receiver<serde_json::Value>, TransportError> {
        let wire_topic = topic.replace('.', "/");
        self.client
            .subscribe(&wire_topic, QoS::AtLeastOnce)
            .await
            .map_err(|error| TransportError::Subscribe(error.to_string()))?;

        let (tx, rx) = mpsc::channel(64);
        self.subscribers.lock().await.push((topic.to_string(), tx));
        Ok(rx)
    }
}
