// crates/smauto-logic/src/error.rs
// ============================================================================
// Module: Evaluation Errors
// Description: Errors raised while evaluating a compiled condition.
// Purpose: Distinguish conditions the runtime should treat as "not yet true"
//          from configuration mistakes worth logging loudly.
// Dependencies: smauto-core, thiserror
// ============================================================================

//! ## Overview
//! Every [`EvalError`] is caught at the top of [`crate::CompiledCondition::evaluate`]
//! and turned into `false` — a condition referencing state that hasn't
//! arrived yet is not a crash, it's evidence the automation isn't ready to
//! fire (`spec.md` §8 property 11: evaluation never panics).

use smauto_core::AttributeName;
use smauto_core::EntityName;
use thiserror::Error;

/// Errors encountered while evaluating a compiled condition.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// The condition referenced an attribute that has never been observed.
    #[error("no known value for {entity}.{attribute}")]
    UnknownAttribute {
        /// Referenced entity.
        entity: EntityName,
        /// Referenced attribute.
        attribute: AttributeName,
    },
    /// A comparator was applied to operand kinds it cannot compare (e.g.
    /// ordering two dictionaries).
    #[error("comparator {comparator} is not defined for this operand kind")]
    IncomparableKinds {
        /// Human-readable comparator name.
        comparator: String,
    },
    /// An aggregate was requested over an attribute with no numeric
    /// representation.
    #[error("aggregate {kind} is not defined over a non-numeric attribute")]
    NonNumericAggregate {
        /// Human-readable aggregate name.
        kind: String,
    },
}
