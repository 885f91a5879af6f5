// crates/smauto-core/src/entity.rs
// ============================================================================
// Module: SmAuto Entities
// Description: Entity declarations: classification, broker binding, topic,
//              and attribute list.
// Purpose: Represent the static shape of an entity (`spec.md` §3).
// Dependencies: crate::attribute, crate::error, crate::identifiers, serde
// ============================================================================

//! ## Overview
//! An [`Entity`] is purely a declaration: its classification, the broker
//! and topic it is bound to, and its ordered attribute list. Live state
//! (current attribute values, history buffers) is owned by `smauto-state`,
//! not here.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::attribute::Attribute;
use crate::error::ConfigError;
use crate::identifiers::BrokerName;
use crate::identifiers::EntityName;

/// Entity classification. Informational only — all kinds may both publish
/// and subscribe (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Primarily reports state.
    Sensor,
    /// Primarily receives commands.
    Actuator,
    /// Both reports state and receives commands.
    Hybrid,
}

/// A declared entity: identity, classification, broker binding, and
/// attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Stable entity name.
    pub name: EntityName,
    /// Classification (informational).
    pub kind: EntityKind,
    /// Name of the broker this entity communicates over.
    pub broker: BrokerName,
    /// Dot-separated topic the entity publishes and subscribes on.
    pub topic: String,
    /// Ordered attribute declarations.
    pub attributes: Vec<Attribute>,
}

impl Entity {
    /// Validates that attribute names are unique and that any `Time`
    /// default values are in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateAttribute`] on a repeated attribute
    /// name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for attribute in &self.attributes {
            if !seen.insert(attribute.name.clone()) {
                return Err(ConfigError::DuplicateAttribute {
                    entity: self.name.clone(),
                    attribute: attribute.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Returns the built-in system clock entity (`spec.md` §3), bound to
    /// the given broker.
    #[must_use]
    pub fn system_clock(broker: BrokerName) -> Self {
        Self {
            name: crate::SYSTEM_CLOCK_ENTITY.into(),
            kind: EntityKind::Sensor,
            broker,
            topic: crate::SYSTEM_CLOCK_TOPIC.to_string(),
            attributes: vec![Attribute::new(
                crate::SYSTEM_CLOCK_ATTRIBUTE,
                crate::attribute::AttributeKind::Time,
            )],
        }
    }
}
