// crates/smauto-core/src/automation.rs
// ============================================================================
// Module: SmAuto Automations
// Description: Automation declarations, their actions, and their lifecycle
//              state (`spec.md` §3, §4.E).
// Purpose: Represent the static shape of an automation plus the runtime
//          states its state machine can be in.
// Dependencies: crate::attribute, crate::condition, crate::identifiers, serde
// ============================================================================

//! ## Overview
//! An [`Automation`] pairs a [`crate::Condition`] with a list of [`Action`]s
//! and the scheduling knobs that control how often it is checked and how it
//! relates to its peers (`after`/`starts`/`stops`). [`AutomationState`] is
//! the four-state lifecycle the engine drives each automation through.

use serde::Deserialize;
use serde::Serialize;

use crate::attribute::AttributeValue;
use crate::condition::Condition;
use crate::identifiers::AttributeName;
use crate::identifiers::AutomationName;
use crate::identifiers::EntityName;

/// A single `entity.attribute = value` assignment, applied when an
/// automation's condition is satisfied (`spec.md` §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Target entity.
    pub entity: EntityName,
    /// Target attribute on that entity.
    pub attribute: AttributeName,
    /// Value to assign.
    pub value: AttributeValue,
}

/// The lifecycle state of a running automation (`spec.md` §4.E).
///
/// Mirrors the four-state machine the reference runtime's automation object
/// cycles through: idle while waiting, running while its condition holds
/// true, and one of two exited states once it stops re-arming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomationState {
    /// Waiting for its condition to become true.
    Idle,
    /// Condition is true; actions have been (or are being) dispatched.
    Running,
    /// Terminated normally — a non-continuous or one-shot automation fired
    /// and will not be evaluated again.
    ExitedSuccess,
    /// Terminated abnormally — evaluation raised an internal error and the
    /// automation was disabled rather than retried indefinitely.
    ExitedFailure,
}

impl AutomationState {
    /// Whether the automation is still eligible to be evaluated again.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Idle | Self::Running)
    }
}

fn default_freq() -> f64 {
    1.0
}

const fn default_true() -> bool {
    true
}

/// A declared automation: trigger condition, actions, and scheduling
/// behavior (`spec.md` §3, §4.E).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Automation {
    /// Stable automation name, unique model-wide.
    pub name: AutomationName,
    /// Trigger condition.
    pub condition: Condition,
    /// Actions dispatched when the condition is satisfied.
    pub actions: Vec<Action>,
    /// Evaluation frequency in Hz. Zero or unset is treated as `1.0`
    /// (`spec.md` §4.E).
    #[serde(default = "default_freq")]
    pub freq: f64,
    /// Whether the automation starts enabled. Disabled automations are
    /// never evaluated until enabled by a peer's `starts` list.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether the automation re-arms (returns to `Idle`) after firing.
    /// `false` means it fires at most once.
    #[serde(default = "default_true")]
    pub continuous: bool,
    /// Whether the automation evaluates its condition only once total,
    /// regardless of `continuous` (`spec.md` §4.E).
    #[serde(default)]
    pub check_once: bool,
    /// Automations that must currently be anything other than `RUNNING`
    /// before this one begins evaluating (`spec.md` §4.E dependency
    /// barrier) — not full completion, just "not mid-fire".
    #[serde(default)]
    pub after: Vec<AutomationName>,
    /// Automations to enable when this one fires.
    #[serde(default)]
    pub starts: Vec<AutomationName>,
    /// Automations to disable when this one fires.
    #[serde(default)]
    pub stops: Vec<AutomationName>,
}

impl Automation {
    /// The effective evaluation frequency: `freq` unless it is zero or
    /// negative, in which case `1.0` (`spec.md` §4.E).
    #[must_use]
    pub fn effective_freq(&self) -> f64 {
        if self.freq > 0.0 {
            self.freq
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_freq_falls_back_to_one_hertz() {
        let automation = Automation {
            name: "a".into(),
            condition: Condition::Primitive {
                left: crate::condition::Operand::Literal(AttributeValue::Bool(true)),
                comparator: crate::condition::Comparator::Eq,
                right: crate::condition::Operand::Literal(AttributeValue::Bool(true)),
            },
            actions: Vec::new(),
            freq: 0.0,
            enabled: true,
            continuous: true,
            check_once: false,
            after: Vec::new(),
            starts: Vec::new(),
            stops: Vec::new(),
        };
        assert!((automation.effective_freq() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn idle_and_running_are_active() {
        assert!(AutomationState::Idle.is_active());
        assert!(AutomationState::Running.is_active());
        assert!(!AutomationState::ExitedSuccess.is_active());
        assert!(!AutomationState::ExitedFailure.is_active());
    }
}
