// system-tests/tests/s4_starts_stops_cascade.rs
// ============================================================================
// Scenario: Starts/stops cascade (`spec.md` §8 S4).
// ============================================================================

use std::time::Duration;

use smauto_core::condition::{Comparator, Operand};
use smauto_core::{Action, Automation, AttributeValue, Condition};
use smauto_engine::Engine;
use system_tests::poll_until;

fn always_true() -> Condition {
    Condition::Primitive {
        left: Operand::Literal(AttributeValue::Bool(true)),
        comparator: Comparator::Eq,
        right: Operand::Literal(AttributeValue::Bool(true)),
    }
}

fn automation_a() -> Automation {
    Automation {
        name: "a".into(),
        condition: always_true(),
        actions: Vec::<Action>::new(),
        freq: 20.0,
        enabled: true,
        continuous: false,
        check_once: true,
        after: Vec::new(),
        starts: vec!["b".into()],
        stops: vec!["c".into()],
    }
}

fn peer(name: &str, enabled: bool) -> Automation {
    Automation {
        name: name.into(),
        condition: always_true(),
        actions: Vec::new(),
        freq: 20.0,
        enabled,
        continuous: true,
        check_once: false,
        after: Vec::new(),
        starts: Vec::new(),
        stops: Vec::new(),
    }
}

#[tokio::test]
async fn firing_automation_flips_its_peers_enabled_flags() {
    let automations = vec![automation_a(), peer("b", false), peer("c", true)];
    let engine = Engine::bootstrap(Vec::new(), Vec::new(), automations).await.unwrap();

    let cascaded = poll_until(Duration::from_millis(800), Duration::from_millis(5), || {
        let handles = engine.handles();
        handles.get(&"b".into()).unwrap().is_enabled() && !handles.get(&"c".into()).unwrap().is_enabled()
    })
    .await;

    assert!(cascaded, "expected a's fire to enable b and disable c");
}
