// crates/smauto-engine/src/error.rs
// ============================================================================
// Module: Engine Errors
// Description: Errors raised while bootstrapping an `Engine`.
// Purpose: Distinguish model mistakes (unknown broker reference) from
//          transport failures at startup (`spec.md` §7).
// Dependencies: smauto-broker, smauto-core, thiserror
// ============================================================================

use smauto_broker::TransportError;
use smauto_core::identifiers::{BrokerName, EntityName};
use thiserror::Error;

/// Errors raised while building an [`crate::Engine`] from a model.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An entity references a broker name absent from the model's broker
    /// list.
    #[error("entity {entity} references unknown broker {broker}")]
    UnknownBroker {
        /// The entity making the bad reference.
        entity: EntityName,
        /// The broker name it references.
        broker: BrokerName,
    },
    /// Connecting to a declared broker failed at startup.
    #[error("failed to connect broker {broker}: {source}")]
    Transport {
        /// The broker that failed to connect.
        broker: BrokerName,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },
}
