// system-tests/tests/s6_time_comparison.rs
// ============================================================================
// Scenario: Time comparison (`spec.md` §8 S6).
// ============================================================================

use std::time::Duration;

use serde_json::json;
use smauto_core::condition::{BoolOp, Comparator, Operand};
use smauto_core::{Action, Attribute, AttributeKind, AttributeValue, Automation, Condition, EntityKind, Time};
use smauto_engine::Engine;
use system_tests::{attr, entity, memory_broker, poll_until};

fn clock_in_the_ten_pm_hour() -> Automation {
    let condition = Condition::Group {
        left: Box::new(Condition::Primitive {
            left: Operand::Attr {
                entity: "system_clock".into(),
                attribute: "time".into(),
            },
            comparator: Comparator::Gt,
            right: Operand::Literal(AttributeValue::Time(Time::new(22, 0, 0).unwrap())),
        }),
        op: BoolOp::And,
        right: Box::new(Condition::Primitive {
            left: Operand::Attr {
                entity: "system_clock".into(),
                attribute: "time".into(),
            },
            comparator: Comparator::Lt,
            right: Operand::Literal(AttributeValue::Time(Time::new(23, 0, 0).unwrap())),
        }),
    };

    Automation {
        name: "night_mode".into(),
        condition,
        actions: vec![Action {
            entity: "indicator".into(),
            attribute: "on".into(),
            value: AttributeValue::Bool(true),
        }],
        freq: 20.0,
        enabled: true,
        continuous: true,
        check_once: false,
        after: Vec::new(),
        starts: Vec::new(),
        stops: Vec::new(),
    }
}

#[tokio::test]
async fn night_mode_fires_only_inside_the_ten_pm_hour() {
    let brokers = vec![memory_broker("home")];
    // Declaring `system_clock` explicitly binds it to our own memory broker,
    // so the engine does not spawn its wall-clock producer and the test
    // controls the clock's value directly.
    let entities = vec![
        entity("system_clock", EntityKind::Sensor, "home", "system.clock", vec![attr("time", AttributeKind::Time)]),
        entity(
            "indicator",
            EntityKind::Actuator,
            "home",
            "home.indicator",
            vec![Attribute::new("on", AttributeKind::Bool)],
        ),
    ];

    let engine = Engine::bootstrap(brokers, entities, vec![clock_in_the_ten_pm_hour()]).await.unwrap();

    engine
        .store()
        .apply_message(&"system_clock".into(), &json!({"time": {"hour": 21, "minute": 59, "second": 59}}))
        .unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(
        engine.store().get(&"indicator".into(), &"on".into()),
        Some(AttributeValue::Bool(false)),
        "indicator must stay off before the 22:00 boundary"
    );

    engine
        .store()
        .apply_message(&"system_clock".into(), &json!({"time": {"hour": 22, "minute": 30, "second": 0}}))
        .unwrap();

    let fired = poll_until(Duration::from_millis(500), Duration::from_millis(10), || {
        engine.store().get(&"indicator".into(), &"on".into()) == Some(AttributeValue::Bool(true))
    })
    .await;
    assert!(fired, "expected indicator to turn on once the clock entered the 22:00 hour");
}
