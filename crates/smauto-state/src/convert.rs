// crates/smauto-state/src/convert.rs
// ============================================================================
// Module: JSON Attribute Conversion
// Description: Converts inbound JSON values into typed AttributeValues.
// Purpose: Enforce declared-attribute type preservation on ingestion
//          (`spec.md` §8 property 1), matching the reference runtime's
//          per-kind update rules, including the `Time` special case.
// Dependencies: smauto-core, serde_json
// ============================================================================

use serde_json::Value;
use smauto_core::AttributeKind;
use smauto_core::AttributeValue;
use smauto_core::Time;

/// Converts `json` into an [`AttributeValue`] matching `kind`, rejecting a
/// shape mismatch rather than guessing (`spec.md` §8 property 1).
pub fn convert(kind: AttributeKind, json: &Value) -> Option<AttributeValue> {
    match kind {
        AttributeKind::Int => json.as_i64().map(AttributeValue::Int),
        AttributeKind::Float => json.as_f64().map(AttributeValue::Float),
        AttributeKind::String => json.as_str().map(|s| AttributeValue::String(s.to_string())),
        AttributeKind::Bool => json.as_bool().map(AttributeValue::Bool),
        AttributeKind::Time => convert_time(json),
        AttributeKind::List => {
            json.as_array().map(|items| AttributeValue::List(items.iter().map(infer).collect()))
        }
        // Only the fields present in `json` — `EntityStateStore::apply_message`
        // merges this against the previous stored value so an update naming
        // one sub-field doesn't drop the others (`spec.md` §4.B).
        AttributeKind::Dict => json.as_object().map(|fields| {
            AttributeValue::Dict(fields.iter().map(|(k, v)| (k.clone(), infer(v))).collect())
        }),
    }
}

/// Time attributes arrive as a nested `{hour, minute, second}` object; the
/// reference runtime replaces the three fields in place rather than
/// accepting an encoded integer or string (`spec.md` §4.B).
fn convert_time(json: &Value) -> Option<AttributeValue> {
    let object = json.as_object()?;
    let hour = u8::try_from(object.get("hour")?.as_u64()?).ok()?;
    let minute = u8::try_from(object.get("minute")?.as_u64()?).ok()?;
    let second = u8::try_from(object.get("second")?.as_u64()?).ok()?;
    Time::new(hour, minute, second).ok().map(AttributeValue::Time)
}

/// Infers an `AttributeValue` for a value nested inside a schema-less
/// `List`/`Dict` container, where there is no declared kind to check
/// against.
fn infer(json: &Value) -> AttributeValue {
    match json {
        Value::Null => AttributeValue::Bool(false),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => {
            n.as_i64().map_or_else(|| AttributeValue::Float(n.as_f64().unwrap_or(0.0)), AttributeValue::Int)
        }
        Value::String(s) => AttributeValue::String(s.clone()),
        Value::Array(items) => AttributeValue::List(items.iter().map(infer).collect()),
        Value::Object(fields) => {
            AttributeValue::Dict(fields.iter().map(|(k, v)| (k.clone(), infer(v))).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn int_rejects_string_payload() {
        assert_eq!(convert(AttributeKind::Int, &json!("nope")), None);
    }

    #[test]
    fn time_replaces_all_three_components() {
        let value = convert(AttributeKind::Time, &json!({"hour": 7, "minute": 30, "second": 0}));
        assert_eq!(value, Some(AttributeValue::Time(Time::new(7, 30, 0).unwrap())));
    }

    #[test]
    fn time_rejects_out_of_range_component() {
        assert_eq!(convert(AttributeKind::Time, &json!({"hour": 25, "minute": 0, "second": 0})), None);
    }

    #[test]
    fn dict_infers_nested_types() {
        let value = convert(AttributeKind::Dict, &json!({"a": 1, "b": "x", "c": [1, 2]}));
        let AttributeValue::Dict(fields) = value.unwrap() else {
            panic!("expected dict");
        };
        assert_eq!(fields.get("a"), Some(&AttributeValue::Int(1)));
        assert_eq!(fields.get("b"), Some(&AttributeValue::String("x".to_string())));
        assert_eq!(fields.get("c"), Some(&AttributeValue::List(vec![AttributeValue::Int(1), AttributeValue::Int(2)])));
    }
}
