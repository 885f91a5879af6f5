// crates/smauto-engine/src/publish.rs
// ============================================================================
// Module: Publish Targets
// Description: Resolves an entity name to its transport and topic.
// Purpose: Let the action dispatcher (§4.D) and runner publish without
//          knowing how brokers were connected (`spec.md` §4.F).
// Dependencies: smauto-broker, smauto-core
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use smauto_broker::Transport;
use smauto_core::identifiers::EntityName;

/// Where one entity's messages go: which live transport, and which topic.
pub struct PublishTarget {
    /// The transport bound to the entity's declared broker.
    pub transport: Arc<dyn Transport>,
    /// The entity's dot-separated topic (translated to wire form inside
    /// the transport itself, per `spec.md` §6).
    pub topic: String,
}

/// Lookup table from entity name to its publish target, built once at
/// engine bootstrap.
#[derive(Default)]
pub struct PublishTargets {
    targets: HashMap<EntityName, PublishTarget>,
}

impl PublishTargets {
    /// Registers `entity`'s target.
    pub fn insert(&mut self, entity: EntityName, target: PublishTarget) {
        self.targets.insert(entity, target);
    }

    /// Looks up an entity's publish target.
    #[must_use]
    pub fn get(&self, entity: &EntityName) -> Option<&PublishTarget> {
        self.targets.get(entity)
    }
}
