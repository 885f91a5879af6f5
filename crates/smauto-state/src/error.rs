// crates/smauto-state/src/error.rs
// ============================================================================
// Module: State Store Errors
// Description: Errors raised while applying inbound broker messages.
// Purpose: Distinguish a message for an unknown entity (config/topic
//          mismatch) from a malformed payload shape.
// Dependencies: smauto-core, thiserror
// ============================================================================

use smauto_core::EntityName;
use thiserror::Error;

/// Errors raised while applying a broker message to the state store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The message's topic resolved to an entity the store was never told
    /// about.
    #[error("no entity registered for incoming message: {0}")]
    UnknownEntity(EntityName),
    /// The payload was not a JSON object and cannot be merged into entity
    /// state (`spec.md` §4.B: state is always a flat-or-nested object).
    #[error("payload for entity {0} was not a JSON object")]
    InvalidPayload(EntityName),
}
