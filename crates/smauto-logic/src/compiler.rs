// crates/smauto-logic/src/compiler.rs
// ============================================================================
// Module: Condition Compiler
// Description: Compiles a `Condition` AST into an evaluable closure tree.
// Purpose: Pay the AST-walk cost once per automation, not once per tick
//          (`spec.md` §9 Design Notes).
// Dependencies: smauto-core, crate::aggregate, crate::error
// ============================================================================

//! ## Overview
//! [`compile`] turns a [`Condition`] into a [`CompiledCondition`]: a boxed
//! closure tree that reads through a [`StateReader`] and never re-walks the
//! AST. Operand resolution and comparator dispatch happen by runtime value
//! kind, matching the unification of the primitive condition forms into a
//! single [`smauto_core::Condition::Primitive`] variant.

use std::fmt;
use std::sync::Arc;

use smauto_core::AggKind;
use smauto_core::AttributeValue;
use smauto_core::BoolOp;
use smauto_core::Comparator;
use smauto_core::Condition;
use smauto_core::Operand;
use smauto_core::StateReader;

use crate::aggregate;
use crate::error::EvalError;

type EvalFn = dyn Fn(&dyn StateReader) -> Result<bool, EvalError> + Send + Sync;

/// A condition tree compiled into a single evaluable closure.
///
/// Cloning a `CompiledCondition` is cheap: the closure is held behind an
/// `Arc`.
#[derive(Clone)]
pub struct CompiledCondition {
    eval: Arc<EvalFn>,
    rendered: String,
}

impl fmt::Debug for CompiledCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledCondition").field("rendered", &self.rendered).finish()
    }
}

impl CompiledCondition {
    /// Evaluates the condition against `reader`.
    ///
    /// Never panics: any [`EvalError`] (missing state, an incomparable
    /// operand pair) is logged at `debug` level and treated as `false`
    /// (`spec.md` §8 property 11 — a condition referencing state that
    /// hasn't arrived yet is not ready to fire, not a crash).
    #[must_use]
    pub fn evaluate(&self, reader: &dyn StateReader) -> bool {
        match (self.eval)(reader) {
            Ok(result) => result,
            Err(error) => {
                tracing::debug!(condition = %self.rendered, %error, "condition evaluation deferred");
                false
            }
        }
    }

    /// Evaluates the condition, surfacing the error instead of collapsing
    /// it to `false`. Used by callers (e.g. a `validate` CLI path) that
    /// want to distinguish "not yet true" from a genuine evaluation
    /// problem.
    pub fn try_evaluate(&self, reader: &dyn StateReader) -> Result<bool, EvalError> {
        (self.eval)(reader)
    }

    /// A human-readable rendering of the compiled tree, suitable for logs
    /// and the `graph`/`gen` CLI surfaces.
    #[must_use]
    pub fn render(&self) -> &str {
        &self.rendered
    }
}

/// Compiles a [`Condition`] AST into a [`CompiledCondition`].
///
/// Callers must first declare every aggregate window the condition
/// references via [`StateReader::ensure_capacity`] (see
/// [`smauto_core::Condition::aggregate_windows`]) before evaluating.
#[must_use]
pub fn compile(condition: &Condition) -> CompiledCondition {
    let rendered = render(condition);
    let eval = compile_node(condition);
    CompiledCondition {
        eval: Arc::from(eval),
        rendered,
    }
}

fn compile_node(condition: &Condition) -> Box<EvalFn> {
    match condition {
        Condition::Group {
            left,
            op,
            right,
        } => {
            let left = compile_node(left);
            let right = compile_node(right);
            let op = *op;
            Box::new(move |reader| {
                let left = left(reader)?;
                let right = right(reader)?;
                Ok(op.apply(left, right))
            })
        }
        Condition::Primitive {
            left,
            comparator,
            right,
        } => {
            let left = left.clone();
            let right = right.clone();
            let comparator = *comparator;
            Box::new(move |reader| {
                let left = resolve(&left, reader)?;
                let right = resolve(&right, reader)?;
                compare(comparator, &left, &right)
            })
        }
        Condition::InRange {
            attr,
            min,
            max,
        } => {
            let attr = attr.clone();
            let min = min.clone();
            let max = max.clone();
            Box::new(move |reader| {
                let attr = resolve(&attr, reader)?;
                let min = resolve(&min, reader)?;
                let max = resolve(&max, reader)?;
                let (attr, min, max) = (numeric(&attr)?, numeric(&min)?, numeric(&max)?);
                Ok(min < attr && attr < max)
            })
        }
    }
}

fn resolve(operand: &Operand, reader: &dyn StateReader) -> Result<AttributeValue, EvalError> {
    match operand {
        Operand::Literal(value) => Ok(value.clone()),
        Operand::Attr {
            entity,
            attribute,
        } => reader.get(entity, attribute).ok_or_else(|| EvalError::UnknownAttribute {
            entity: entity.clone(),
            attribute: attribute.clone(),
        }),
        Operand::Aggregate {
            kind,
            entity,
            attribute,
            window,
        } => {
            let samples = reader.history(entity, attribute, *window);
            Ok(AttributeValue::Float(aggregate::reduce(*kind, &samples)))
        }
    }
}

fn numeric(value: &AttributeValue) -> Result<f64, EvalError> {
    value.as_numeric().ok_or_else(|| EvalError::NonNumericAggregate {
        kind: format!("{value:?}"),
    })
}

fn compare(
    comparator: Comparator,
    left: &AttributeValue,
    right: &AttributeValue,
) -> Result<bool, EvalError> {
    match comparator {
        Comparator::Eq => Ok(equal(left, right)),
        Comparator::Ne => Ok(!equal(left, right)),
        Comparator::Gt | Comparator::Ge | Comparator::Lt | Comparator::Le => {
            compare_ordered(comparator, left, right)
        }
        Comparator::In => Ok(membership(right, left)),
        Comparator::NotIn => Ok(!membership(right, left)),
        Comparator::Has => Ok(membership(left, right)),
        Comparator::HasNot => Ok(!membership(left, right)),
    }
}

/// Equality with numeric coercion: aggregates always resolve to `Float`
/// while literals from the declarative source deserialize as `Int`, so
/// `humidity_mean == 60` must not compare `Float(60.0)` to `Int(60)` by
/// derived equality (always `false`). Falls back to derived equality for
/// non-numeric kinds.
fn equal(left: &AttributeValue, right: &AttributeValue) -> bool {
    match (left.as_numeric(), right.as_numeric()) {
        (Some(left), Some(right)) => left == right,
        _ => left == right,
    }
}

fn compare_ordered(
    comparator: Comparator,
    left: &AttributeValue,
    right: &AttributeValue,
) -> Result<bool, EvalError> {
    if let (AttributeValue::String(left), AttributeValue::String(right)) = (left, right) {
        return Ok(apply_ordering(comparator, left.cmp(right)));
    }
    let (left, right) = (numeric(left)?, numeric(right)?);
    let Some(ordering) = left.partial_cmp(&right) else {
        return Err(EvalError::IncomparableKinds {
            comparator: format!("{comparator:?}"),
        });
    };
    Ok(apply_ordering(comparator, ordering))
}

fn apply_ordering(comparator: Comparator, ordering: std::cmp::Ordering) -> bool {
    use std::cmp::Ordering::{Equal, Greater, Less};
    match comparator {
        Comparator::Gt => ordering == Greater,
        Comparator::Ge => matches!(ordering, Greater | Equal),
        Comparator::Lt => ordering == Less,
        Comparator::Le => matches!(ordering, Less | Equal),
        _ => false,
    }
}

/// `needle`'s membership in `haystack`: list containment by value, dict
/// containment by string key, or substring containment between strings.
fn membership(haystack: &AttributeValue, needle: &AttributeValue) -> bool {
    match haystack {
        AttributeValue::List(items) => items.contains(needle),
        AttributeValue::Dict(map) => {
            matches!(needle, AttributeValue::String(key) if map.contains_key(key))
        }
        AttributeValue::String(haystack) => {
            matches!(needle, AttributeValue::String(needle) if haystack.contains(needle.as_str()))
        }
        _ => false,
    }
}

fn render(condition: &Condition) -> String {
    match condition {
        Condition::Group {
            left,
            op,
            right,
        } => format!("({} {} {})", render(left), render_op(*op), render(right)),
        Condition::Primitive {
            left,
            comparator,
            right,
        } => format!(
            "{} {} {}",
            render_operand(left),
            render_comparator(*comparator),
            render_operand(right)
        ),
        Condition::InRange {
            attr,
            min,
            max,
        } => format!("{} in ({}, {})", render_operand(attr), render_operand(min), render_operand(max)),
    }
}

fn render_operand(operand: &Operand) -> String {
    match operand {
        Operand::Literal(value) => format!("{value:?}"),
        Operand::Attr {
            entity,
            attribute,
        } => format!("{entity}.{attribute}"),
        Operand::Aggregate {
            kind,
            entity,
            attribute,
            window,
        } => format!("{}({}.{}, {})", render_agg(*kind), entity, attribute, window),
    }
}

const fn render_op(op: BoolOp) -> &'static str {
    match op {
        BoolOp::And => "and",
        BoolOp::Or => "or",
        BoolOp::Not => "not",
        BoolOp::Xor => "xor",
        BoolOp::Nor => "nor",
        BoolOp::Xnor => "xnor",
        BoolOp::Nand => "nand",
    }
}

const fn render_comparator(comparator: Comparator) -> &'static str {
    match comparator {
        Comparator::Eq => "==",
        Comparator::Ne => "!=",
        Comparator::Gt => ">",
        Comparator::Ge => ">=",
        Comparator::Lt => "<",
        Comparator::Le => "<=",
        Comparator::In => "in",
        Comparator::NotIn => "not in",
        Comparator::Has => "has",
        Comparator::HasNot => "has not",
    }
}

const fn render_agg(kind: AggKind) -> &'static str {
    match kind {
        AggKind::Mean => "mean",
        AggKind::Std => "std",
        AggKind::Var => "var",
        AggKind::Min => "min",
        AggKind::Max => "max",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use smauto_core::AttributeName;
    use smauto_core::EntityName;

    use super::*;

    // `Mutex`, not `RefCell`: `StateReader` requires `Send + Sync`.
    struct FakeReader {
        values: HashMap<(EntityName, AttributeName), AttributeValue>,
        histories: Mutex<HashMap<(EntityName, AttributeName), Vec<f64>>>,
    }

    impl FakeReader {
        fn new() -> Self {
            Self {
                values: HashMap::new(),
                histories: Mutex::new(HashMap::new()),
            }
        }

        fn with(mut self, entity: &str, attribute: &str, value: AttributeValue) -> Self {
            self.values.insert((entity.into(), attribute.into()), value);
            self
        }

        fn with_history(self, entity: &str, attribute: &str, samples: Vec<f64>) -> Self {
            self.histories.lock().unwrap().insert((entity.into(), attribute.into()), samples);
            self
        }
    }

    impl StateReader for FakeReader {
        fn get(&self, entity: &EntityName, attribute: &AttributeName) -> Option<AttributeValue> {
            self.values.get(&(entity.clone(), attribute.clone())).cloned()
        }

        fn history(&self, entity: &EntityName, attribute: &AttributeName, window: u32) -> Vec<f64> {
            let stored = self
                .histories
                .lock()
                .unwrap()
                .get(&(entity.clone(), attribute.clone()))
                .cloned()
                .unwrap_or_default();
            let mut padded = vec![0.0; (window as usize).saturating_sub(stored.len())];
            padded.extend(stored);
            padded
        }

        fn ensure_capacity(&self, _entity: &EntityName, _attribute: &AttributeName, _window: u32) {}
    }

    #[test]
    fn primitive_gt_on_direct_attribute() {
        let reader = FakeReader::new().with("thermostat", "temp", AttributeValue::Float(23.5));
        let condition = Condition::Primitive {
            left: Operand::Attr {
                entity: "thermostat".into(),
                attribute: "temp".into(),
            },
            comparator: Comparator::Gt,
            right: Operand::Literal(AttributeValue::Float(20.0)),
        };
        assert!(compile(&condition).evaluate(&reader));
    }

    #[test]
    fn unknown_attribute_evaluates_false_not_panic() {
        let reader = FakeReader::new();
        let condition = Condition::Primitive {
            left: Operand::Attr {
                entity: "thermostat".into(),
                attribute: "temp".into(),
            },
            comparator: Comparator::Gt,
            right: Operand::Literal(AttributeValue::Float(20.0)),
        };
        let compiled = compile(&condition);
        assert!(!compiled.evaluate(&reader));
        assert!(compiled.try_evaluate(&reader).is_err());
    }

    #[test]
    fn aggregate_mean_over_window() {
        let reader =
            FakeReader::new().with_history("humidity", "value", vec![10.0, 20.0, 30.0, 40.0]);
        let condition = Condition::Primitive {
            left: Operand::Aggregate {
                kind: AggKind::Mean,
                entity: "humidity".into(),
                attribute: "value".into(),
                window: 4,
            },
            comparator: Comparator::Eq,
            right: Operand::Literal(AttributeValue::Float(25.0)),
        };
        assert!(compile(&condition).evaluate(&reader));
    }

    #[test]
    fn eq_coerces_float_aggregate_against_int_literal() {
        let reader =
            FakeReader::new().with_history("humidity", "value", vec![50.0, 60.0, 70.0]);
        let condition = Condition::Primitive {
            left: Operand::Aggregate {
                kind: AggKind::Mean,
                entity: "humidity".into(),
                attribute: "value".into(),
                window: 3,
            },
            comparator: Comparator::Eq,
            right: Operand::Literal(AttributeValue::Int(60)),
        };
        assert!(compile(&condition).evaluate(&reader));
    }

    #[test]
    fn in_range_is_exclusive_on_both_bounds() {
        let reader = FakeReader::new().with("sensor", "x", AttributeValue::Int(50));
        let condition = Condition::InRange {
            attr: Operand::Attr {
                entity: "sensor".into(),
                attribute: "x".into(),
            },
            min: Operand::Literal(AttributeValue::Int(50)),
            max: Operand::Literal(AttributeValue::Int(100)),
        };
        assert!(!compile(&condition).evaluate(&reader));
    }

    #[test]
    fn has_checks_list_membership() {
        let reader = FakeReader::new().with(
            "door",
            "allowed_codes",
            AttributeValue::List(vec![AttributeValue::Int(1), AttributeValue::Int(2)]),
        );
        let condition = Condition::Primitive {
            left: Operand::Attr {
                entity: "door".into(),
                attribute: "allowed_codes".into(),
            },
            comparator: Comparator::Has,
            right: Operand::Literal(AttributeValue::Int(2)),
        };
        assert!(compile(&condition).evaluate(&reader));
    }

    #[test]
    fn group_not_matches_xor_truth_table() {
        let reader = FakeReader::new()
            .with("a", "v", AttributeValue::Bool(true))
            .with("b", "v", AttributeValue::Bool(false));
        let condition = Condition::Group {
            left: Box::new(Condition::Primitive {
                left: Operand::Attr {
                    entity: "a".into(),
                    attribute: "v".into(),
                },
                comparator: Comparator::Eq,
                right: Operand::Literal(AttributeValue::Bool(true)),
            }),
            op: BoolOp::Not,
            right: Box::new(Condition::Primitive {
                left: Operand::Attr {
                    entity: "b".into(),
                    attribute: "v".into(),
                },
                comparator: Comparator::Eq,
                right: Operand::Literal(AttributeValue::Bool(true)),
            }),
        };
        assert!(compile(&condition).evaluate(&reader));
    }
}
