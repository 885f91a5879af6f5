// crates/smauto-broker/src/memory.rs
// ============================================================================
// Module: In-Memory Transport
// Description: A `Transport` backed by tokio broadcast channels.
// Purpose: Back the built-in system clock and end-to-end tests without a
//          real broker (`spec.md` §3, §8).
// Dependencies: async-trait, tokio, crate::{error, transport}
// ============================================================================

//! ## Overview
//! [`MemoryTransport`] fans a topic out to every subscriber via
//! `tokio::sync::broadcast`, matching the shape of a pub/sub broker without
//! opening a socket. It never fails to connect — there is nothing to
//! connect to — so it's also what `smauto-engine` uses for the built-in
//! system clock entity.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::transport::Transport;

const CHANNEL_CAPACITY: usize = 256;

/// An in-process publish/subscribe transport, one broadcast channel per
/// topic.
#[derive(Default)]
pub struct MemoryTransport {
    topics: Mutex<HashMap<String, broadcast::Sender<serde_json::Value>>>,
}

impl MemoryTransport {
    /// Creates an empty in-memory transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sender_for(&self, topic: &str) -> broadcast::Sender<serde_json::Value> {
        let mut topics = self.topics.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), TransportError> {
        // No receivers yet is not an error: a publish before any subscriber
        // exists is simply dropped, matching a real pub/sub broker.
        let _ = self.sender_for(topic).send(payload);
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<mpsc::Receiver<serde_json::Value>, TransportError> {
        let mut broadcast_rx = self.sender_for(topic).subscribe();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(async move {
            while let Ok(value) = broadcast_rx.recv().await {
                if tx.send(value).await.is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_messages() {
        let transport = MemoryTransport::new();
        let mut rx = transport.subscribe("sensors.temp").await.unwrap();
        transport.publish("sensors.temp", json!({"value": 21})).await.unwrap();
        let received = rx.recv().await.unwrap();
        assert_eq!(received, json!({"value": 21}));
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_error() {
        let transport = MemoryTransport::new();
        assert!(transport.publish("nobody.listening", json!(1)).await.is_ok());
    }
}
