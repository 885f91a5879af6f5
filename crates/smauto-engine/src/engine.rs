// crates/smauto-engine/src/engine.rs
// ============================================================================
// Module: Engine Bootstrap
// Description: Builds brokers, entities, automations, and the built-in
//              clock from a model, then runs until cancelled.
// Purpose: The single entry point `smauto-cli`'s `interpret` command uses
//          (`spec.md` §4.F).
// Dependencies: smauto-broker, smauto-core, smauto-logic, smauto-state,
//               tokio, tracing, crate::{clock, error, ingest, publish, runner}
// ============================================================================

//! ## Overview
//! [`Engine::bootstrap`] runs the six-step sequence `spec.md` §4.F
//! describes: connect brokers deduplicated by name, build entity state and
//! open subscriptions/publishers, ensure `system_clock` exists, compile
//! every automation's condition (which declares buffer capacities as a
//! side effect), spawn one runner per automation plus the clock producer,
//! and return an [`Engine`] whose [`Engine::run`] blocks until cancelled.

use std::collections::HashMap;
use std::sync::Arc;

use smauto_broker::{BrokerRegistry, MemoryTransport};
use smauto_core::identifiers::{AutomationName, BrokerName};
use smauto_core::{Automation, Broker, Entity, StateReader};
use smauto_state::EntityStateStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::clock::SystemClockProducer;
use crate::error::EngineError;
use crate::ingest::forward;
use crate::publish::{PublishTarget, PublishTargets};
use crate::runner::{AutomationHandle, AutomationRunner, HandleTable};

const SYSTEM_CLOCK_BROKER: &str = "__system_clock__";

/// A fully bootstrapped runtime: live brokers, entity state, and spawned
/// automation/clock tasks. Dropping the cancellation sender (via
/// [`Engine::shutdown`]) stops every task at its next sleep boundary.
pub struct Engine {
    store: Arc<EntityStateStore>,
    handles: Arc<HandleTable>,
    cancel_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Engine {
    /// Runs the full bootstrap sequence (`spec.md` §4.F) and spawns every
    /// task. Returns as soon as everything is running; call [`Engine::run`]
    /// to block until cancellation.
    pub async fn bootstrap(
        brokers: Vec<Broker>,
        entities: Vec<Entity>,
        automations: Vec<Automation>,
    ) -> Result<Self, EngineError> {
        let mut registry = BrokerRegistry::connect_all(&brokers)
            .await
            .map_err(|(broker, source)| EngineError::Transport { broker, source })?;

        let entities = with_system_clock(entities, &mut registry);
        let store = Arc::new(EntityStateStore::new(&entities));

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let mut tasks = Vec::new();
        let mut targets = PublishTargets::default();

        for entity in &entities {
            let Some(transport) = registry.get(&entity.broker) else {
                return Err(EngineError::UnknownBroker {
                    entity: entity.name.clone(),
                    broker: entity.broker.clone(),
                });
            };
            targets.insert(
                entity.name.clone(),
                PublishTarget {
                    transport: Arc::clone(&transport),
                    topic: entity.topic.clone(),
                },
            );
            tasks.push(tokio::spawn(forward(
                entity.name.clone(),
                entity.topic.clone(),
                transport,
                Arc::clone(&store),
                cancel_rx.clone(),
            )));
        }
        let targets = Arc::new(targets);

        if let Some(clock_transport) = registry.get(&BrokerName::new(SYSTEM_CLOCK_BROKER)) {
            let producer = SystemClockProducer::new(clock_transport);
            let clock_cancel = cancel_rx.clone();
            tasks.push(tokio::spawn(async move { producer.run(clock_cancel).await }));
        }

        let handles: Arc<HandleTable> = Arc::new(
            automations
                .iter()
                .map(|automation| (automation.name.clone(), Arc::new(AutomationHandle::new(automation.enabled))))
                .collect::<HashMap<AutomationName, Arc<AutomationHandle>>>(),
        );

        for automation in automations {
            let compiled = smauto_logic::compile(&automation.condition);
            for (entity, attribute, window) in automation.condition.aggregate_windows() {
                store.ensure_capacity(&entity, &attribute, window);
            }
            let freq_hz = automation.effective_freq();
            let runner = AutomationRunner::new(
                automation.name,
                compiled,
                automation.actions,
                freq_hz,
                automation.check_once,
                automation.continuous,
                automation.after,
                automation.starts,
                automation.stops,
                Arc::clone(&handles),
                store.clone() as Arc<dyn StateReader>,
                Arc::clone(&targets),
            );
            let runner_cancel = cancel_rx.clone();
            tasks.push(tokio::spawn(async move { runner.run(runner_cancel).await }));
        }

        Ok(Self {
            store,
            handles,
            cancel_tx,
            tasks,
        })
    }

    /// Blocks until [`Engine::shutdown`] is called (typically from a
    /// `Ctrl+C` handler running concurrently), then waits for every
    /// spawned task to exit before returning.
    pub async fn run(mut self) {
        // `cancel_tx` is only ever flipped by `shutdown`; awaiting the
        // join handles here just means "run forever until someone calls
        // shutdown, then drain".
        while let Some(task) = self.tasks.pop() {
            if let Err(error) = task.await {
                tracing::warn!(%error, "engine task panicked");
            }
        }
    }

    /// Signals every runner and subscriber to exit at its next tick
    /// boundary (`spec.md` §4.F, §5 cancellation).
    pub fn shutdown(&self) {
        let _ = self.cancel_tx.send(true);
    }

    /// Read-only access to live entity state, for diagnostics/tests.
    #[must_use]
    pub fn store(&self) -> &Arc<EntityStateStore> {
        &self.store
    }

    /// Read-only access to automation handles, for diagnostics/tests.
    #[must_use]
    pub fn handles(&self) -> &Arc<HandleTable> {
        &self.handles
    }
}

/// Ensures the built-in `system_clock` entity exists, adding it (bound to
/// a private in-memory broker registered under the clock) if the model did
/// not declare one explicitly (`spec.md` §3, §4.F step 3).
fn with_system_clock(mut entities: Vec<Entity>, registry: &mut BrokerRegistry) -> Vec<Entity> {
    if entities.iter().any(|e| e.name.as_str() == smauto_core::SYSTEM_CLOCK_ENTITY) {
        return entities;
    }
    let broker_name = BrokerName::new(SYSTEM_CLOCK_BROKER);
    registry.insert(broker_name.clone(), Arc::new(MemoryTransport::new()));
    entities.push(Entity::system_clock(broker_name));
    entities
}
