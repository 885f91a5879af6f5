// crates/smauto-engine/src/runner.rs
// ============================================================================
// Module: Automation Runner
// Description: Per-automation IDLE/RUNNING/EXITED state machine.
// Purpose: Drive one automation's condition evaluation, dependency
//          barrier, and peer enable/disable effects (`spec.md` §4.E).
// Dependencies: smauto-core, smauto-logic, tokio, tracing, crate::action
// ============================================================================

//! ## Overview
//! [`AutomationRunner::run`] is a single `tokio::task` body: while `IDLE`
//! it polls the `after` dependency barrier at 1 Hz; once clear it moves to
//! `RUNNING` and evaluates its condition at `freq` Hz until it fires, then
//! settles back to `IDLE` for one tick (the state `spec.md` §4.E calls
//! `EXITED_SUCCESS`) before re-arming — unless `checkOnce` or
//! `continuous=false` disabled it on the way out. `enabled`/`state` are
//! plain atomics shared with every other runner so `starts`/`stops` need
//! no lock (`spec.md` §5).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use smauto_core::identifiers::{AutomationName, EntityName};
use smauto_core::{Action, AutomationState, StateReader};
use smauto_logic::CompiledCondition;
use tokio::sync::watch;

use crate::action::ActionDispatcher;
use crate::publish::PublishTargets;

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const EXITED_SUCCESS: u8 = 2;
const EXITED_FAILURE: u8 = 3;

fn encode(state: AutomationState) -> u8 {
    match state {
        AutomationState::Idle => IDLE,
        AutomationState::Running => RUNNING,
        AutomationState::ExitedSuccess => EXITED_SUCCESS,
        AutomationState::ExitedFailure => EXITED_FAILURE,
    }
}

/// Decodes the raw atomic state. Any unrecognized byte (unreachable in
/// practice — only this module writes the atomic) maps to `Idle` rather
/// than panicking a runner task.
fn decode(raw: u8) -> AutomationState {
    match raw {
        RUNNING => AutomationState::Running,
        EXITED_SUCCESS => AutomationState::ExitedSuccess,
        EXITED_FAILURE => AutomationState::ExitedFailure,
        _ => AutomationState::Idle,
    }
}

/// The shared, lock-free flags every runner exposes to its peers.
pub struct AutomationHandle {
    enabled: AtomicBool,
    state: AtomicU8,
}

impl AutomationHandle {
    /// Creates a handle starting enabled-or-not per the model, in `Idle`.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            state: AtomicU8::new(IDLE),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> AutomationState {
        decode(self.state.load(Ordering::Acquire))
    }

    /// Whether the automation is currently enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Sets the enabled flag (`starts`/`stops` effects, `spec.md` §4.E).
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    fn set_state(&self, state: AutomationState) {
        self.state.store(encode(state), Ordering::Release);
    }
}

/// Map of every automation's shared handle, keyed by name, so a runner can
/// reach its `after`/`starts`/`stops` peers.
pub type HandleTable = HashMap<AutomationName, Arc<AutomationHandle>>;

/// Drives one automation through its lifecycle.
pub struct AutomationRunner {
    name: AutomationName,
    condition: CompiledCondition,
    actions: Vec<Action>,
    period: Duration,
    check_once: bool,
    continuous: bool,
    after: Vec<AutomationName>,
    starts: Vec<AutomationName>,
    stops: Vec<AutomationName>,
    handle: Arc<AutomationHandle>,
    handles: Arc<HandleTable>,
    reader: Arc<dyn StateReader>,
    targets: Arc<PublishTargets>,
}

impl AutomationRunner {
    /// Builds a runner for one automation. `handles` must already contain
    /// an entry for `name` (the engine constructs every handle before any
    /// runner starts).
    #[must_use]
    #[allow(clippy::too_many_arguments, reason = "bundles one automation's full static config")]
    pub fn new(
        name: AutomationName,
        condition: CompiledCondition,
        actions: Vec<Action>,
        freq_hz: f64,
        check_once: bool,
        continuous: bool,
        after: Vec<AutomationName>,
        starts: Vec<AutomationName>,
        stops: Vec<AutomationName>,
        handles: Arc<HandleTable>,
        reader: Arc<dyn StateReader>,
        targets: Arc<PublishTargets>,
    ) -> Self {
        let handle = Arc::clone(handles.get(&name).expect("engine registers every automation's handle before spawning runners"));
        Self {
            name,
            condition,
            actions,
            period: Duration::from_secs_f64(1.0 / freq_hz),
            check_once,
            continuous,
            after,
            starts,
            stops,
            handle,
            handles,
            reader,
            targets,
        }
    }

    /// Runs the state machine until `cancel` reports `true`.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        loop {
            if !self.wait_for_barrier(&mut cancel).await {
                return;
            }
            self.handle.set_state(AutomationState::Running);
            tracing::debug!(automation = %self.name, "entering RUNNING");

            let fired = self.run_until_fired_or_cancelled(&mut cancel).await;
            if !fired {
                return;
            }

            // Settle one tick in EXITED_SUCCESS, then unconditionally
            // re-arm to IDLE (`spec.md` §4.E) — `enabled` alone governs
            // whether the next IDLE->RUNNING cycle ever evaluates true.
            if sleep_or_cancel(self.period, &mut cancel).await.is_none() {
                return;
            }
            self.handle.set_state(AutomationState::Idle);
        }
    }

    /// Polls the `after` barrier at 1 Hz while IDLE. Returns `false` if
    /// cancelled first.
    async fn wait_for_barrier(&self, cancel: &mut watch::Receiver<bool>) -> bool {
        loop {
            if *cancel.borrow() {
                return false;
            }
            if self.barrier_clear() {
                return true;
            }
            if sleep_or_cancel(Duration::from_secs(1), cancel).await.is_none() {
                return false;
            }
        }
    }

    fn barrier_clear(&self) -> bool {
        self.after.iter().all(|dependency| {
            self.handles
                .get(dependency)
                .is_none_or(|handle| handle.state() != AutomationState::Running)
        })
    }

    /// Ticks at `freq` Hz while RUNNING. Returns `true` once the condition
    /// fires (actions dispatched, peers updated, own state set to
    /// `ExitedSuccess`), or `false` if cancelled first.
    async fn run_until_fired_or_cancelled(&self, cancel: &mut watch::Receiver<bool>) -> bool {
        loop {
            if *cancel.borrow() {
                return false;
            }
            if self.handle.is_enabled() && self.condition.evaluate(self.reader.as_ref()) {
                self.fire().await;
                return true;
            }
            if sleep_or_cancel(self.period, cancel).await.is_none() {
                return false;
            }
        }
    }

    async fn fire(&self) {
        tracing::debug!(automation = %self.name, condition = %self.condition.render(), "condition triggered");
        self.publish_actions().await;
        for name in &self.starts {
            if let Some(peer) = self.handles.get(name) {
                peer.set_enabled(true);
            }
        }
        for name in &self.stops {
            if let Some(peer) = self.handles.get(name) {
                peer.set_enabled(false);
            }
        }
        if self.check_once || !self.continuous {
            self.handle.set_enabled(false);
        }
        self.handle.set_state(AutomationState::ExitedSuccess);
    }

    async fn publish_actions(&self) {
        for (entity, payload) in ActionDispatcher::dispatch(&self.actions) {
            self.publish_one(&entity, payload).await;
        }
    }

    async fn publish_one(&self, entity: &EntityName, payload: serde_json::Value) {
        let Some(target) = self.targets.get(entity) else {
            tracing::warn!(automation = %self.name, %entity, "action targets an entity with no transport");
            return;
        };
        if let Err(error) = target.transport.publish(&target.topic, payload).await {
            tracing::warn!(automation = %self.name, %entity, %error, "action publish failed");
        }
    }
}

/// Sleeps for `duration`, waking early on cancellation. Returns `None` if
/// cancellation fired during the sleep.
async fn sleep_or_cancel(duration: Duration, cancel: &mut watch::Receiver<bool>) -> Option<()> {
    tokio::select! {
        () = tokio::time::sleep(duration) => Some(()),
        result = cancel.changed() => {
            if result.is_err() || *cancel.borrow() {
                None
            } else {
                Some(())
            }
        }
    }
}
