// crates/smauto-core/src/lib.rs
// ============================================================================
// Crate: smauto-core
// Description: Canonical SmAuto data model shared by every other crate.
// Purpose: Define entities, attributes, brokers, automations, the Condition
//          AST, and the StateReader trait boundary, without depending on any
//          storage, transport, or async runtime.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//!
//! `smauto-core` holds the data model described by the SmAuto language:
//! [`Entity`], [`Attribute`], [`Broker`], [`Automation`], and the
//! [`Condition`] AST. It also defines [`StateReader`], the trait boundary
//! through which condition evaluation (`smauto-logic`) reads live entity
//! state without depending on how that state is stored (`smauto-state`).
//!
//! Nothing here talks to a broker, a clock, or an async runtime: this crate
//! is the shared vocabulary the rest of the workspace builds on.

pub mod attribute;
pub mod automation;
pub mod broker;
pub mod condition;
pub mod entity;
pub mod error;
pub mod identifiers;
pub mod state_reader;

pub use attribute::Attribute;
pub use attribute::AttributeKind;
pub use attribute::AttributeValue;
pub use attribute::Time;
pub use automation::Action;
pub use automation::Automation;
pub use automation::AutomationState;
pub use broker::Broker;
pub use broker::BrokerAuth;
pub use broker::BrokerKind;
pub use condition::AggKind;
pub use condition::BoolOp;
pub use condition::Comparator;
pub use condition::Condition;
pub use condition::Operand;
pub use entity::Entity;
pub use entity::EntityKind;
pub use error::ConfigError;
pub use identifiers::AttributeName;
pub use identifiers::AutomationName;
pub use identifiers::BrokerName;
pub use identifiers::EntityName;
pub use state_reader::StateReader;

/// Name and topic of the built-in system clock entity (`spec.md` §3).
pub const SYSTEM_CLOCK_ENTITY: &str = "system_clock";
/// Topic the built-in system clock entity publishes on.
pub const SYSTEM_CLOCK_TOPIC: &str = "system.clock";
/// Attribute name carrying the clock's current time.
pub const SYSTEM_CLOCK_ATTRIBUTE: &str = "time";
