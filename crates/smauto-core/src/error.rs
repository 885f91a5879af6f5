// crates/smauto-core/src/error.rs
// ============================================================================
// Module: SmAuto Configuration Errors
// Description: Errors raised while building a model (`spec.md` §7 kind 1).
// Purpose: Give the engine a typed reason to refuse to start.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! `ConfigError` covers every failure that must be caught before the engine
//! starts: duplicate names, invalid `Time` literals, and dangling
//! references between automations/entities/brokers. These are always
//! fatal at startup (`spec.md` §7 kind 1) — never raised once the engine is
//! running.

use thiserror::Error;

use crate::identifiers::AttributeName;
use crate::identifiers::AutomationName;
use crate::identifiers::BrokerName;
use crate::identifiers::EntityName;

/// Errors raised while building a SmAuto model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two entities declared the same name.
    #[error("duplicate entity name: {0}")]
    DuplicateEntity(EntityName),
    /// Two automations declared the same name.
    #[error("duplicate automation name: {0}")]
    DuplicateAutomation(AutomationName),
    /// Two brokers declared the same name.
    #[error("duplicate broker name: {0}")]
    DuplicateBroker(BrokerName),
    /// Two attributes on the same entity declared the same name.
    #[error("entity {entity} has duplicate attribute name: {attribute}")]
    DuplicateAttribute {
        /// Owning entity.
        entity: EntityName,
        /// Repeated attribute name.
        attribute: AttributeName,
    },
    /// A `Time` literal had an out-of-range component.
    #[error("invalid time literal {hour:02}:{minute:02}:{second:02}")]
    InvalidTime {
        /// Raw hour component.
        hour: u8,
        /// Raw minute component.
        minute: u8,
        /// Raw second component.
        second: u8,
    },
    /// An entity referenced a broker that was not declared.
    #[error("entity {entity} references unknown broker {broker}")]
    UnknownBroker {
        /// Referencing entity.
        entity: EntityName,
        /// Missing broker name.
        broker: BrokerName,
    },
    /// A condition or action referenced an entity that was not declared.
    #[error("automation {automation} references unknown entity {entity}")]
    UnknownEntity {
        /// Referencing automation.
        automation: AutomationName,
        /// Missing entity name.
        entity: EntityName,
    },
    /// A condition or action referenced an attribute not declared on its
    /// entity.
    #[error("automation {automation} references unknown attribute {entity}.{attribute}")]
    UnknownAttribute {
        /// Referencing automation.
        automation: AutomationName,
        /// Entity the attribute was expected on.
        entity: EntityName,
        /// Missing attribute name.
        attribute: AttributeName,
    },
    /// An automation's `after`/`starts`/`stops` referenced an unknown peer.
    #[error("automation {automation} references unknown automation {other}")]
    UnknownAutomation {
        /// Referencing automation.
        automation: AutomationName,
        /// Missing peer automation name.
        other: AutomationName,
    },
    /// An aggregate window size was declared as zero.
    #[error("automation {automation} declares a zero-size aggregate window on {entity}.{attribute}")]
    ZeroWindow {
        /// Referencing automation.
        automation: AutomationName,
        /// Entity the window is declared on.
        entity: EntityName,
        /// Attribute the window is declared on.
        attribute: AttributeName,
    },
}
