// crates/smauto-broker/src/redis.rs
// ============================================================================
// Module: Redis Transport
// Description: A `Transport` backed by the `redis` crate's pub/sub API.
// Purpose: Connect to Redis brokers (`spec.md` §4.A).
// Dependencies: async-trait, redis, serde_json, tokio, tracing,
//               crate::{backoff, error, transport}
// ============================================================================

//! ## Overview
//! [`RedisTransport`] keeps a multiplexed async connection for publishes
//! and opens a dedicated pub/sub connection per `subscribe` call, since
//! Redis pub/sub connections can't also issue regular commands. A dropped
//! pub/sub connection is reconnected with [`Backoff`] from inside the
//! forwarding task.

use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::mpsc;

use crate::backoff::Backoff;
use crate::error::TransportError;
use crate::transport::Transport;

/// A live Redis connection, one per declared broker.
pub struct RedisTransport {
    client: redis::Client,
    connection: redis::aio::MultiplexedConnection,
}

impl RedisTransport {
    /// Connects to `url` (e.g. `redis://host:port`).
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let client = redis::Client::open(url).map_err(|error| TransportError::Connect(error.to_string()))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| TransportError::Connect(error.to_string()))?;
        Ok(Self { client, connection })
    }
}

#[async_trait]
impl Transport for RedisTransport {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), TransportError> {
        let bytes = serde_json::to_vec(&payload)
            .map_err(|error| TransportError::Publish(error.to_string()))?;
        let mut connection = self.connection.clone();
        connection
            .publish::<_, _, ()>(topic, bytes)
            .await
            .map_err(|error| TransportError::Publish(error.to_string()))
    }

    async fn subscribe(&self, topic: &str) -> Result<mpsc::Receiver<serde_json::Value>, TransportError> {
        let client = self.client.clone();
        let topic = topic.to_string();
        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            let mut backoff = Backoff::default();
            loop {
                let pubsub = match client.get_async_pubsub().await {
                    Ok(mut pubsub) => {
                        if let Err(error) = pubsub.subscribe(&topic).await {
                            tracing::warn!(%topic, %error, "Redis subscribe failed");
                            let delay = backoff.next_delay();
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        pubsub
                    }
                    Err(error) => {
                        let delay = backoff.next_delay();
                        tracing::warn!(%topic, %error, ?delay, "Redis pub/sub connect failed, retrying");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                };
                backoff.reset();

                let mut stream = pubsub.into_on_message();
                use futures_util::StreamExt;
                while let Some(message) = stream.next().await {
                    let bytes: Vec<u8> = match message.get_payload() {
                        Ok(bytes) => bytes,
                        Err(error) => {
                            tracing::warn!(%topic, %error, "malformed Redis payload");
                            continue;
                        }
                    };
                    let value: serde_json::Value = match serde_json::from_slice(&bytes) {
                        Ok(value) => value,
                        Err(error) => {
                            tracing::warn!(%topic, %error, "dropping non-JSON Redis payload");
                            continue;
                        }
                    };
                    if tx.send(value).await.is_err() {
                        return;
                    }
                }

                let delay = backoff.next_delay();
                tracing::warn!(%topic, ?delay, "Redis pub/sub stream ended, reconnecting");
                tokio::time::sleep(delay).await;
            }
        });

        Ok(rx)
    }
}
