// crates/smauto-state/src/lib.rs
// ============================================================================
// Crate: smauto-state
// Description: Live entity state storage: current values and history
//              ring buffers.
// Purpose: Implement `smauto_core::StateReader` and ingest broker messages
//          (`spec.md` §4.B).
// Dependencies: smauto-core, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//!
//! `smauto-state` is the only crate that owns mutable entity state. It
//! implements [`smauto_core::StateReader`] so `smauto-logic` can evaluate
//! conditions against it without knowing this crate exists, and exposes
//! [`EntityStateStore::apply_message`] as the single ingestion path a
//! broker subscription callback drives.

mod convert;
mod error;
mod history;
mod store;

pub use error::StateError;
pub use history::HistoryBuffer;
pub use store::EntityStateStore;
