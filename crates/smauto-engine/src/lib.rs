// crates/smauto-engine/src/lib.rs
// ============================================================================
// Crate: smauto-engine
// Description: Action dispatch, the per-automation state machine, the
//              built-in system clock, and engine bootstrap.
// Purpose: Tie `smauto-core`/`-logic`/`-state`/`-broker` into a runnable
//          SmAuto engine (`spec.md` §4.D-F).
// Dependencies: smauto-broker, smauto-core, smauto-logic, smauto-state,
//               tokio, tracing
// ============================================================================

//! ## Overview
//!
//! `smauto-engine` is components D-F of the system (`spec.md` §2): the
//! action dispatcher ([`ActionDispatcher`]), the automation state machine
//! ([`AutomationRunner`]), and engine bootstrap ([`Engine`]). It also owns
//! the built-in system clock producer ([`SystemClockProducer`]), since
//! that is itself just another always-on publisher the engine starts.

mod action;
mod clock;
mod engine;
mod error;
mod ingest;
mod publish;
mod runner;

pub use action::ActionDispatcher;
pub use clock::SystemClockProducer;
pub use engine::Engine;
pub use error::EngineError;
pub use publish::{PublishTarget, PublishTargets};
pub use runner::{AutomationHandle, AutomationRunner, HandleTable};
