// crates/smauto-logic/src/lib.rs
// ============================================================================
// Crate: smauto-logic
// Description: Compiles the SmAuto condition AST into evaluable closures.
// Purpose: Pay AST-walk cost once per automation at startup; evaluate on
//          every tick through a cheap closure call (`spec.md` §9).
// Dependencies: smauto-core, thiserror, tracing
// ============================================================================

//! ## Overview
//!
//! `smauto-logic` is the boundary between the static [`smauto_core::Condition`]
//! tree and live evaluation. It depends only on `smauto_core`'s data model
//! and `StateReader` trait — never on how state is stored or how a broker
//! message arrived, so it can be unit tested against a fake reader.

mod aggregate;
mod compiler;
mod error;

pub use compiler::CompiledCondition;
pub use compiler::compile;
pub use error::EvalError;
