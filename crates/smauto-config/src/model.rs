// crates/smauto-config/src/model.rs
// ============================================================================
// Module: Model
// Description: The canonical on-disk (TOML/JSON) description of brokers,
//              entities, and automations.
// Purpose: Load a model file and validate it before the engine starts
//          (`spec.md` §7 kind 1).
// Dependencies: smauto-core, serde, serde_json, toml, crate::error
// ============================================================================

//! ## Overview
//! [`Model`] is the **(added)** schema `smauto-cli` and `smauto-engine`
//! build on: a flat `{brokers, entities, automations}` document that
//! deserializes straight into `smauto-core` types. [`Model::load`] reads
//! either TOML or JSON by file extension; [`Model::validate`] walks the
//! whole tree enforcing every `spec.md` §7 kind-1 configuration error —
//! duplicate names, dangling references, out-of-range `Time` literals, and
//! zero-size aggregate windows — none of which `serde`'s derives catch on
//! their own.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use smauto_core::identifiers::{AttributeName, AutomationName, BrokerName, EntityName};
use smauto_core::{Action, AttributeValue, Automation, Broker, ConfigError, Condition, Entity, Operand, Time};

use crate::error::LoadError;

/// The full on-disk model: every broker, entity, and automation the engine
/// should build at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    /// Declared brokers.
    #[serde(default)]
    pub brokers: Vec<Broker>,
    /// Declared entities.
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Declared automations.
    #[serde(default)]
    pub automations: Vec<Automation>,
}

impl Model {
    /// Reads and parses a model file (`.toml` or `.json` by extension),
    /// then validates it.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] on I/O failure, parse failure, or a
    /// [`ConfigError`] from [`Model::validate`].
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let display_path = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: display_path.clone(),
            source,
        })?;

        let model: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content).map_err(|source| LoadError::Toml {
                path: display_path.clone(),
                source,
            })?,
            Some("json") => serde_json::from_str(&content).map_err(|source| LoadError::Json {
                path: display_path.clone(),
                source,
            })?,
            _ => return Err(LoadError::UnknownFormat { path: display_path }),
        };

        model.validate()?;
        Ok(model)
    }

    /// Validates the model for internal consistency (`spec.md` §7 kind 1).
    /// Checks are ordered so the first error reported is also the most
    /// structural (duplicate names before dangling references).
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let brokers = self.check_duplicate_brokers()?;
        self.check_duplicate_entities()?;
        self.check_duplicate_automations()?;

        let mut entities: HashMap<&EntityName, &Entity> = HashMap::new();
        for entity in &self.entities {
            entity.validate()?;
            if !brokers.contains(&entity.broker) {
                return Err(ConfigError::UnknownBroker {
                    entity: entity.name.clone(),
                    broker: entity.broker.clone(),
                });
            }
            entities.insert(&entity.name, entity);
        }

        let automation_names: BTreeSet<&AutomationName> = self.automations.iter().map(|a| &a.name).collect();

        for automation in &self.automations {
            for peer in automation.after.iter().chain(&automation.starts).chain(&automation.stops) {
                if !automation_names.contains(peer) {
                    return Err(ConfigError::UnknownAutomation {
                        automation: automation.name.clone(),
                        other: peer.clone(),
                    });
                }
            }

            check_condition(&automation.name, &automation.condition, &entities)?;

            for action in &automation.actions {
                check_entity_attribute(&automation.name, &action.entity, &action.attribute, &entities)?;
                check_value_time_literals(&automation.name, &action.value)?;
            }
        }

        Ok(())
    }

    fn check_duplicate_brokers(&self) -> Result<BTreeSet<BrokerName>, ConfigError> {
        let mut seen = BTreeSet::new();
        for broker in &self.brokers {
            if !seen.insert(broker.name.clone()) {
                return Err(ConfigError::DuplicateBroker(broker.name.clone()));
            }
        }
        Ok(seen)
    }

    fn check_duplicate_entities(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for entity in &self.entities {
            if !seen.insert(entity.name.clone()) {
                return Err(ConfigError::DuplicateEntity(entity.name.clone()));
            }
        }
        Ok(())
    }

    fn check_duplicate_automations(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for automation in &self.automations {
            if !seen.insert(automation.name.clone()) {
                return Err(ConfigError::DuplicateAutomation(automation.name.clone()));
            }
        }
        Ok(())
    }
}

fn check_condition(
    automation: &AutomationName,
    condition: &Condition,
    entities: &HashMap<&EntityName, &Entity>,
) -> Result<(), ConfigError> {
    match condition {
        Condition::Group { left, right, .. } => {
            check_condition(automation, left, entities)?;
            check_condition(automation, right, entities)?;
        }
        Condition::Primitive { left, right, .. } => {
            check_operand(automation, left, entities)?;
            check_operand(automation, right, entities)?;
        }
        Condition::InRange { attr, min, max } => {
            check_operand(automation, attr, entities)?;
            check_operand(automation, min, entities)?;
            check_operand(automation, max, entities)?;
        }
    }
    Ok(())
}

fn check_operand(
    automation: &AutomationName,
    operand: &Operand,
    entities: &HashMap<&EntityName, &Entity>,
) -> Result<(), ConfigError> {
    match operand {
        Operand::Literal(value) => check_value_time_literals(automation, value),
        Operand::Attr { entity, attribute } => check_entity_attribute(automation, entity, attribute, entities),
        Operand::Aggregate {
            entity,
            attribute,
            window,
            ..
        } => {
            if *window == 0 {
                return Err(ConfigError::ZeroWindow {
                    automation: automation.clone(),
                    entity: entity.clone(),
                    attribute: attribute.clone(),
                });
            }
            check_entity_attribute(automation, entity, attribute, entities)
        }
    }
}

fn check_entity_attribute(
    automation: &AutomationName,
    entity_name: &EntityName,
    attribute_name: &AttributeName,
    entities: &HashMap<&EntityName, &Entity>,
) -> Result<(), ConfigError> {
    let Some(entity) = entities.get(entity_name) else {
        return Err(ConfigError::UnknownEntity {
            automation: automation.clone(),
            entity: entity_name.clone(),
        });
    };
    if !entity.attributes.iter().any(|a| &a.name == attribute_name) {
        return Err(ConfigError::UnknownAttribute {
            automation: automation.clone(),
            entity: entity_name.clone(),
            attribute: attribute_name.clone(),
        });
    }
    Ok(())
}

/// Recursively validates any `Time` literal embedded in a value (including
/// nested inside `List`/`Dict`), since `Time`'s `Deserialize` derive
/// accepts out-of-range components and only [`Time::new`] enforces the
/// invariant.
fn check_value_time_literals(automation: &AutomationName, value: &AttributeValue) -> Result<(), ConfigError> {
    match value {
        AttributeValue::Time(t) => {
            Time::new(t.hour, t.minute, t.second)?;
        }
        AttributeValue::List(items) => {
            for item in items {
                check_value_time_literals(automation, item)?;
            }
        }
        AttributeValue::Dict(fields) => {
            for field in fields.values() {
                check_value_time_literals(automation, field)?;
            }
        }
        AttributeValue::Int(_) | AttributeValue::Float(_) | AttributeValue::String(_) | AttributeValue::Bool(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use smauto_core::attribute::AttributeKind;
    use smauto_core::condition::{BoolOp, Comparator};
    use smauto_core::{Attribute, BrokerKind, EntityKind};

    use super::*;

    fn broker() -> Broker {
        Broker {
            name: "mqtt1".into(),
            kind: BrokerKind::Mqtt,
            host: "localhost".to_string(),
            port: None,
            auth: None,
            ssl: false,
            amqp: None,
            redis: None,
        }
    }

    fn entity() -> Entity {
        Entity {
            name: "lamp".into(),
            kind: EntityKind::Actuator,
            broker: "mqtt1".into(),
            topic: "bedroom.lamp".to_string(),
            attributes: vec![Attribute::new("power", AttributeKind::Bool)],
        }
    }

    #[test]
    fn valid_model_passes() {
        let model = Model {
            brokers: vec![broker()],
            entities: vec![entity()],
            automations: vec![],
        };
        assert!(model.validate().is_ok());
    }

    #[test]
    fn entity_referencing_unknown_broker_is_rejected() {
        let mut bad_entity = entity();
        bad_entity.broker = "missing".into();
        let model = Model {
            brokers: vec![broker()],
            entities: vec![bad_entity],
            automations: vec![],
        };
        assert!(matches!(model.validate(), Err(ConfigError::UnknownBroker { .. })));
    }

    #[test]
    fn automation_referencing_unknown_attribute_is_rejected() {
        let automation = Automation {
            name: "a".into(),
            condition: Condition::Primitive {
                left: Operand::Attr {
                    entity: "lamp".into(),
                    attribute: "missing".into(),
                },
                comparator: Comparator::Eq,
                right: Operand::Literal(AttributeValue::Bool(true)),
            },
            actions: vec![],
            freq: 1.0,
            enabled: true,
            continuous: true,
            check_once: false,
            after: vec![],
            starts: vec![],
            stops: vec![],
        };
        let model = Model {
            brokers: vec![broker()],
            entities: vec![entity()],
            automations: vec![automation],
        };
        assert!(matches!(model.validate(), Err(ConfigError::UnknownAttribute { .. })));
    }

    #[test]
    fn zero_size_aggregate_window_is_rejected() {
        let automation = Automation {
            name: "a".into(),
            condition: Condition::Primitive {
                left: Operand::Aggregate {
                    kind: smauto_core::condition::AggKind::Mean,
                    entity: "lamp".into(),
                    attribute: "power".into(),
                    window: 0,
                },
                comparator: Comparator::Eq,
                right: Operand::Literal(AttributeValue::Bool(true)),
            },
            actions: vec![],
            freq: 1.0,
            enabled: true,
            continuous: true,
            check_once: false,
            after: vec![],
            starts: vec![],
            stops: vec![],
        };
        let model = Model {
            brokers: vec![broker()],
            entities: vec![entity()],
            automations: vec![automation],
        };
        assert!(matches!(model.validate(), Err(ConfigError::ZeroWindow { .. })));
    }

    #[test]
    fn out_of_range_time_literal_in_action_is_rejected() {
        let automation = Automation {
            name: "a".into(),
            condition: Condition::Primitive {
                left: Operand::Literal(AttributeValue::Bool(true)),
                comparator: Comparator::Eq,
                right: Operand::Literal(AttributeValue::Bool(true)),
            },
            actions: vec![Action {
                entity: "lamp".into(),
                attribute: "power".into(),
                value: AttributeValue::Time(Time {
                    hour: 99,
                    minute: 0,
                    second: 0,
                }),
            }],
            freq: 1.0,
            enabled: true,
            continuous: true,
            check_once: false,
            after: vec![],
            starts: vec![],
            stops: vec![],
        };
        let model = Model {
            brokers: vec![broker()],
            entities: vec![entity()],
            automations: vec![automation],
        };
        assert!(matches!(model.validate(), Err(ConfigError::InvalidTime { .. })));
    }

    #[test]
    fn bool_op_still_applies_after_round_trip() {
        assert!(BoolOp::And.apply(true, true));
    }
}
