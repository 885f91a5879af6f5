// crates/smauto-broker/src/error.rs
// ============================================================================
// Module: Transport Errors
// Description: Errors raised while connecting to or using a broker
//              transport.
// Purpose: Give callers a typed reason a publish/subscribe failed.
// Dependencies: thiserror
// ============================================================================

use thiserror::Error;

/// Errors raised by a [`crate::Transport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connecting to the broker failed.
    #[error("failed to connect to broker: {0}")]
    Connect(String),
    /// A publish call failed.
    #[error("publish failed: {0}")]
    Publish(String),
    /// A subscribe call failed.
    #[error("subscribe failed: {0}")]
    Subscribe(String),
    /// The broker kind this transport was built for does not match the
    /// broker configuration it was asked to connect to.
    #[error("transport does not support broker kind {0:?}")]
    UnsupportedKind(smauto_core::BrokerKind),
}
