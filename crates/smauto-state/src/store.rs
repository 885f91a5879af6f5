// crates/smauto-state/src/store.rs
// ============================================================================
// Module: Entity State Store
// Description: Live current-value and history storage for declared entities.
// Purpose: The production `StateReader` implementation; ingests broker
//          messages and serves compiled conditions (`spec.md` §4.B).
// Dependencies: smauto-core, serde_json, crate::{convert, error, history}
// ============================================================================

//! ## Overview
//! [`EntityStateStore`] owns one current-value map and one history-buffer
//! map per declared entity. [`EntityStateStore::apply_message`] is the
//! ingestion path a broker subscription calls on every inbound message;
//! [`StateReader`] is the read path the condition compiler evaluates
//! against. A malformed field is logged and skipped rather than rejecting
//! the whole message, matching the reference runtime's best-effort state
//! merge (`spec.md` §4.B).

use std::collections::HashMap;
use std::sync::RwLock;

use smauto_core::AttributeKind;
use smauto_core::AttributeName;
use smauto_core::AttributeValue;
use smauto_core::Entity;
use smauto_core::EntityName;
use smauto_core::StateReader;

use crate::convert;
use crate::error::StateError;
use crate::history::HistoryBuffer;

struct EntityRecord {
    declared: HashMap<AttributeName, AttributeKind>,
    values: RwLock<HashMap<AttributeName, AttributeValue>>,
    histories: RwLock<HashMap<AttributeName, HistoryBuffer>>,
}

/// Live state for every declared entity, keyed by entity name.
pub struct EntityStateStore {
    entities: HashMap<EntityName, EntityRecord>,
}

impl EntityStateStore {
    /// Builds a store seeded with each entity's declared attributes at
    /// their initial values (`spec.md` §3).
    #[must_use]
    pub fn new(entities: &[Entity]) -> Self {
        let mut map = HashMap::with_capacity(entities.len());
        for entity in entities {
            let declared =
                entity.attributes.iter().map(|a| (a.name.clone(), a.kind)).collect();
            let values = entity
                .attributes
                .iter()
                .map(|a| (a.name.clone(), a.initial_value()))
                .collect();
            map.insert(
                entity.name.clone(),
                EntityRecord {
                    declared,
                    values: RwLock::new(values),
                    histories: RwLock::new(HashMap::new()),
                },
            );
        }
        Self {
            entities: map,
        }
    }

    /// Merges an inbound JSON message into `entity`'s state, recording a
    /// numeric sample in its history buffer for any attribute with a
    /// numeric representation.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownEntity`] if no entity is registered
    /// under that name, or [`StateError::InvalidPayload`] if `payload` is
    /// not a JSON object. Individual fields that don't match their
    /// declared kind are logged and skipped — one bad field does not
    /// discard the rest of the message.
    pub fn apply_message(
        &self,
        entity: &EntityName,
        payload: &serde_json::Value,
    ) -> Result<(), StateError> {
        let record =
            self.entities.get(entity).ok_or_else(|| StateError::UnknownEntity(entity.clone()))?;
        let fields =
            payload.as_object().ok_or_else(|| StateError::InvalidPayload(entity.clone()))?;

        let mut values = record.values.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut histories = record.histories.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        for (key, raw) in fields {
            let attribute = AttributeName::from(key.as_str());
            let Some(&kind) = record.declared.get(&attribute) else {
                tracing::debug!(%entity, %attribute, "ignoring update for undeclared attribute");
                continue;
            };
            let Some(mut value) = convert::convert(kind, raw) else {
                tracing::warn!(%entity, %attribute, ?kind, "dropping update with mismatched shape");
                continue;
            };
            if kind == AttributeKind::Dict {
                if let AttributeValue::Dict(ref mut incoming) = value {
                    if let Some(AttributeValue::Dict(previous)) = values.get(&attribute) {
                        for (field, field_value) in previous {
                            incoming.entry(field.clone()).or_insert_with(|| field_value.clone());
                        }
                    }
                }
            }
            if let Some(sample) = value.as_numeric() {
                histories.entry(attribute.clone()).or_insert_with(|| HistoryBuffer::new(0)).push(sample);
            }
            values.insert(attribute, value);
        }
        Ok(())
    }
}

impl StateReader for EntityStateStore {
    fn get(&self, entity: &EntityName, attribute: &AttributeName) -> Option<AttributeValue> {
        let record = self.entities.get(entity)?;
        record.values.read().unwrap_or_else(std::sync::PoisonError::into_inner).get(attribute).cloned()
    }

    fn history(&self, entity: &EntityName, attribute: &AttributeName, window: u32) -> Vec<f64> {
        let window = window as usize;
        self.entities
            .get(entity)
            .and_then(|record| {
                record
                    .histories
                    .read()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .get(attribute)
                    .map(|buffer| buffer.window(window))
            })
            .unwrap_or_else(|| vec![0.0; window])
    }

    fn ensure_capacity(&self, entity: &EntityName, attribute: &AttributeName, window: u32) {
        if let Some(record) = self.entities.get(entity) {
            record
                .histories
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .entry(attribute.clone())
                .or_insert_with(|| HistoryBuffer::new(0))
                .grow_to(window as usize);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use smauto_core::Attribute;
    use smauto_core::BrokerName;
    use smauto_core::Entity;
    use smauto_core::EntityKind;

    use super::*;

    fn thermostat() -> Entity {
        Entity {
            name: "thermostat".into(),
            kind: EntityKind::Sensor,
            broker: BrokerName::from("broker1"),
            topic: "sensors.thermostat".to_string(),
            attributes: vec![
                Attribute::new("temperature", AttributeKind::Float),
                Attribute::new("label", AttributeKind::String),
            ],
        }
    }

    #[test]
    fn initial_values_match_declared_defaults() {
        let store = EntityStateStore::new(&[thermostat()]);
        assert_eq!(store.get(&"thermostat".into(), &"temperature".into()), Some(AttributeValue::Float(0.0)));
    }

    #[test]
    fn apply_message_updates_value_and_history() {
        let store = EntityStateStore::new(&[thermostat()]);
        store.ensure_capacity(&"thermostat".into(), &"temperature".into(), 3);
        store.apply_message(&"thermostat".into(), &json!({"temperature": 21.5})).unwrap();
        store.apply_message(&"thermostat".into(), &json!({"temperature": 22.0})).unwrap();
        assert_eq!(store.get(&"thermostat".into(), &"temperature".into()), Some(AttributeValue::Float(22.0)));
        assert_eq!(store.history(&"thermostat".into(), &"temperature".into(), 3), vec![0.0, 21.5, 22.0]);
    }

    #[test]
    fn apply_message_skips_mismatched_field_but_keeps_others() {
        let store = EntityStateStore::new(&[thermostat()]);
        store
            .apply_message(&"thermostat".into(), &json!({"temperature": "warm", "label": "kitchen"}))
            .unwrap();
        assert_eq!(store.get(&"thermostat".into(), &"temperature".into()), Some(AttributeValue::Float(0.0)));
        assert_eq!(store.get(&"thermostat".into(), &"label".into()), Some(AttributeValue::String("kitchen".to_string())));
    }

    #[test]
    fn partial_dict_update_preserves_other_fields() {
        let entity = Entity {
            name: "thermostat".into(),
            kind: EntityKind::Sensor,
            broker: BrokerName::from("broker1"),
            topic: "sensors.thermostat".to_string(),
            attributes: vec![Attribute::new("config", AttributeKind::Dict)],
        };
        let store = EntityStateStore::new(&[entity]);
        store
            .apply_message(&"thermostat".into(), &json!({"config": {"mode": "auto", "level": 5}}))
            .unwrap();
        store.apply_message(&"thermostat".into(), &json!({"config": {"level": 7}})).unwrap();

        let AttributeValue::Dict(fields) =
            store.get(&"thermostat".into(), &"config".into()).unwrap()
        else {
            panic!("expected dict");
        };
        assert_eq!(fields.get("mode"), Some(&AttributeValue::String("auto".to_string())));
        assert_eq!(fields.get("level"), Some(&AttributeValue::Int(7)));
    }

    #[test]
    fn unknown_entity_is_rejected() {
        let store = EntityStateStore::new(&[thermostat()]);
        assert_eq!(
            store.apply_message(&"missing".into(), &json!({})),
            Err(StateError::UnknownEntity("missing".into()))
        );
    }
}
