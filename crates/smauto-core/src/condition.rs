// crates/smauto-core/src/condition.rs
// ============================================================================
// Module: SmAuto Condition AST
// Description: The parsed condition tree an automation evaluates
//              (`spec.md` §3, §4.C).
// Purpose: Data-only representation; `smauto-logic` compiles this into an
//          evaluable predicate.
// Dependencies: crate::attribute, crate::identifiers, serde
// ============================================================================

//! ## Overview
//! `Condition` is intentionally a plain data tree with no behavior — the
//! textual grammar and parser that produce it are out of scope (`spec.md`
//! §1); this crate only needs to describe the tree's shape so a compiler
//! (`smauto-logic`) and a model loader (`smauto-config`) can both depend on
//! it without depending on each other.
//!
//! Per `spec.md` §9 Design Notes ("operators are dispatched by operand
//! kind"), the six primitive condition forms (Numeric/Bool/String/List/
//! Dict/Time) are unified into a single [`Condition::Primitive`] variant;
//! the evaluator picks behavior from the runtime kind of the operands, not
//! from a per-type AST variant.

use serde::Deserialize;
use serde::Serialize;

use crate::attribute::AttributeValue;
use crate::identifiers::AttributeName;
use crate::identifiers::EntityName;

/// Boolean composition operators (`spec.md` §4.C).
///
/// `Not` and `Xor` share a truth table by design (`spec.md` §9 open
/// question (a)): both resolve to non-equality of their two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolOp {
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
    /// Non-equality of the two sub-results (`a != b`), not logical negation.
    Not,
    /// Exclusive or.
    Xor,
    /// NOR: `!(a || b)`.
    Nor,
    /// XNOR: equality of the two sub-results.
    Xnor,
    /// NAND: `!(a && b)`.
    Nand,
}

impl BoolOp {
    /// Applies the truth table for this operator.
    #[must_use]
    pub const fn apply(self, left: bool, right: bool) -> bool {
        match self {
            Self::And => left && right,
            Self::Or => left || right,
            Self::Not | Self::Xor => left != right,
            Self::Nor => !(left || right),
            Self::Xnor => left == right,
            Self::Nand => !(left && right),
        }
    }
}

/// Comparators for primitive conditions (`spec.md` §4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    /// Equality (`==`, `is`).
    Eq,
    /// Inequality (`!=`, `is not`).
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// `left ∈ right` (`~`, `in`).
    In,
    /// `left ∉ right` (`!~`, `not in`).
    NotIn,
    /// `right ∈ left` (`has`).
    Has,
    /// `right ∉ left` (`has not`).
    HasNot,
}

/// Aggregate reducers over a sliding window (`spec.md` §3, §4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggKind {
    /// Arithmetic mean.
    Mean,
    /// Sample standard deviation.
    Std,
    /// Sample variance.
    Var,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
}

/// An operand to a primitive condition or `InRange`: a literal, a direct
/// attribute reference, or an aggregate over a windowed attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operand {
    /// A literal value (int/float/string/bool/list/dict/time).
    Literal(AttributeValue),
    /// A direct reference to an entity's attribute.
    Attr {
        /// Referenced entity.
        entity: EntityName,
        /// Referenced attribute.
        attribute: AttributeName,
    },
    /// An aggregate (`mean|std|var|min|max`) over a windowed numeric
    /// attribute (`SimpleNumericAttr` in `spec.md` §3).
    Aggregate {
        /// Which reducer to apply.
        kind: AggKind,
        /// Referenced entity.
        entity: EntityName,
        /// Referenced attribute.
        attribute: AttributeName,
        /// Window size, declared to the state store at compile time.
        window: u32,
    },
}

/// The condition AST (`spec.md` §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Condition {
    /// Boolean composition of two sub-conditions.
    Group {
        /// Left sub-condition.
        left: Box<Condition>,
        /// Composition operator.
        op: BoolOp,
        /// Right sub-condition.
        right: Box<Condition>,
    },
    /// A primitive comparison, dispatched by the runtime kind of its
    /// operands.
    Primitive {
        /// Left operand.
        left: Operand,
        /// Comparator.
        comparator: Comparator,
        /// Right operand.
        right: Operand,
    },
    /// `InRange(attr, min, max)` ≡ `min < attr < max` (`spec.md` §4.C).
    InRange {
        /// Attribute (or aggregate) operand being range-checked.
        attr: Operand,
        /// Exclusive lower bound.
        min: Operand,
        /// Exclusive upper bound.
        max: Operand,
    },
}

impl Condition {
    /// Collects every `(entity, attribute, window)` an aggregate in this
    /// tree references, used by the compiler to declare buffer capacities
    /// before evaluation begins (`spec.md` §4.C).
    #[must_use]
    pub fn aggregate_windows(&self) -> Vec<(EntityName, AttributeName, u32)> {
        let mut out = Vec::new();
        self.collect_aggregate_windows(&mut out);
        out
    }

    fn collect_aggregate_windows(&self, out: &mut Vec<(EntityName, AttributeName, u32)>) {
        match self {
            Self::Group {
                left,
                right,
                ..
            } => {
                left.collect_aggregate_windows(out);
                right.collect_aggregate_windows(out);
            }
            Self::Primitive {
                left,
                right,
                ..
            } => {
                collect_operand_window(left, out);
                collect_operand_window(right, out);
            }
            Self::InRange {
                attr,
                min,
                max,
            } => {
                collect_operand_window(attr, out);
                collect_operand_window(min, out);
                collect_operand_window(max, out);
            }
        }
    }
}

fn collect_operand_window(operand: &Operand, out: &mut Vec<(EntityName, AttributeName, u32)>) {
    if let Operand::Aggregate {
        entity,
        attribute,
        window,
        ..
    } = operand
    {
        out.push((entity.clone(), attribute.clone(), *window));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_and_xor_share_a_truth_table() {
        for (a, b) in [(true, true), (true, false), (false, true), (false, false)] {
            assert_eq!(BoolOp::Not.apply(a, b), BoolOp::Xor.apply(a, b));
        }
    }

    #[test]
    fn aggregate_windows_collects_across_group() {
        let cond = Condition::Group {
            left: Box::new(Condition::Primitive {
                left: Operand::Aggregate {
                    kind: AggKind::Mean,
                    entity: "humidity".into(),
                    attribute: "value".into(),
                    window: 5,
                },
                comparator: Comparator::Gt,
                right: Operand::Literal(AttributeValue::Float(60.0)),
            }),
            op: BoolOp::And,
            right: Box::new(Condition::InRange {
                attr: Operand::Aggregate {
                    kind: AggKind::Max,
                    entity: "humidity".into(),
                    attribute: "value".into(),
                    window: 10,
                },
                min: Operand::Literal(AttributeValue::Float(0.0)),
                max: Operand::Literal(AttributeValue::Float(100.0)),
            }),
        };
        let windows = cond.aggregate_windows();
        assert_eq!(windows.len(), 2);
        assert!(windows.contains(&("humidity".into(), "value".into(), 5)));
        assert!(windows.contains(&("humidity".into(), "value".into(), 10)));
    }
}
