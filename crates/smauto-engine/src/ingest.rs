// crates/smauto-engine/src/ingest.rs
// ============================================================================
// Module: Inbound Message Ingestion
// Description: Forwards a transport's subscription stream into the entity
//              state store.
// Purpose: Keep `EntityStateStore` up to date with whatever a broker
//          delivers on an entity's topic (`spec.md` §4.B).
// Dependencies: smauto-broker, smauto-core, smauto-state, tokio, tracing
// ============================================================================

use std::sync::Arc;

use smauto_core::identifiers::EntityName;
use smauto_state::EntityStateStore;
use tokio::sync::watch;

/// Subscribes to `topic` on `transport` and applies every delivered
/// payload to `store` under `entity`, until `cancel` fires or the
/// transport's subscription stream ends.
pub async fn forward(
    entity: EntityName,
    topic: String,
    transport: Arc<dyn smauto_broker::Transport>,
    store: Arc<EntityStateStore>,
    mut cancel: watch::Receiver<bool>,
) {
    let mut messages = match transport.subscribe(&topic).await {
        Ok(messages) => messages,
        Err(error) => {
            tracing::warn!(%entity, %topic, %error, "failed to subscribe entity topic");
            return;
        }
    };

    loop {
        tokio::select! {
            message = messages.recv() => {
                let Some(payload) = message else { break };
                if let Err(error) = store.apply_message(&entity, &payload) {
                    tracing::warn!(%entity, %error, "rejected inbound message");
                }
            }
            _ = cancel.changed() => {
                if *cancel.borrow() {
                    break;
                }
            }
        }
    }
}
