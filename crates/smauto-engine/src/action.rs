// crates/smauto-engine/src/action.rs
// ============================================================================
// Module: Action Dispatcher
// Description: Groups an automation's actions into one JSON publish per
//              entity.
// Purpose: An automation firing against three attributes on the same
//          entity must publish one message, not three (`spec.md` §4.D).
// Dependencies: smauto-core, serde_json
// ============================================================================

//! ## Overview
//! [`ActionDispatcher::dispatch`] takes an automation's ordered `Action`
//! list and folds it into one JSON object per target entity, in the order
//! the actions were declared — a later action for the same attribute wins,
//! matching how the reference runtime's action dict assignment overwrites
//! an earlier key.

use std::collections::BTreeMap;

use smauto_core::identifiers::EntityName;
use smauto_core::Action;

/// Groups and serializes actions for publish.
pub struct ActionDispatcher;

impl ActionDispatcher {
    /// Groups `actions` by target entity, merging each entity's attributes
    /// into a single JSON object. Entities are returned in first-seen
    /// order so logs read in the order the automation declared its
    /// actions.
    #[must_use]
    pub fn dispatch(actions: &[Action]) -> Vec<(EntityName, serde_json::Value)> {
        let mut order: Vec<EntityName> = Vec::new();
        let mut grouped: BTreeMap<EntityName, serde_json::Map<String, serde_json::Value>> = BTreeMap::new();

        for action in actions {
            if !grouped.contains_key(&action.entity) {
                order.push(action.entity.clone());
            }
            let value = action.value.to_wire_json();
            grouped
                .entry(action.entity.clone())
                .or_default()
                .insert(action.attribute.as_str().to_string(), value);
        }

        order
            .into_iter()
            .map(|entity| {
                let fields = grouped.remove(&entity).unwrap_or_default();
                (entity, serde_json::Value::Object(fields))
            })
            .collect()
    }
}
