// crates/smauto-core/src/state_reader.rs
// ============================================================================
// Module: StateReader
// Description: Read-only view of entity state that the condition compiler
//              evaluates against.
// Purpose: Let `smauto-logic` compile and evaluate conditions without
//          depending on `smauto-state`'s storage details.
// Dependencies: crate::attribute, crate::identifiers
// ============================================================================

//! ## Overview
//! `smauto-logic` compiles a [`crate::Condition`] into a closure that reads
//! through this trait. `smauto-state`'s `EntityStateStore` is the only
//! production implementation; tests provide simpler in-memory ones.

use crate::attribute::AttributeValue;
use crate::identifiers::AttributeName;
use crate::identifiers::EntityName;

/// Read-only access to current and historical attribute values.
///
/// `Send + Sync` because a `dyn StateReader` is held behind an `Arc` and
/// moved into the `tokio::spawn`ed automation runner task.
pub trait StateReader: Send + Sync {
    /// Returns the current value of `entity.attribute`, or `None` if the
    /// entity or attribute is not known.
    fn get(&self, entity: &EntityName, attribute: &AttributeName) -> Option<AttributeValue>;

    /// Returns up to `window` most recent numeric samples of
    /// `entity.attribute`, oldest first, zero-padded at the front when
    /// fewer than `window` samples have been observed yet (`spec.md` §4.B:
    /// "reads before the buffer has filled return zeros for the missing
    /// slots").
    fn history(&self, entity: &EntityName, attribute: &AttributeName, window: u32) -> Vec<f64>;

    /// Declares that `entity.attribute` must retain at least `window`
    /// history samples. Called by the compiler before evaluation begins so
    /// the store can size its ring buffers up front (`spec.md` §4.C).
    fn ensure_capacity(&self, entity: &EntityName, attribute: &AttributeName, window: u32);
}
