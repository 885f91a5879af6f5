// crates/smauto-core/src/attribute.rs
// ============================================================================
// Module: SmAuto Attributes
// Description: Typed attribute values, declared attribute kinds, and Time.
// Purpose: Represent entity attribute state and enforce Time's invariants.
// Dependencies: crate::error, crate::identifiers, serde
// ============================================================================

//! ## Overview
//! An [`Attribute`] pairs a declared [`AttributeKind`] with a live
//! [`AttributeValue`]. Inbound JSON updates (`smauto-state`) are applied
//! against the declared kind; a value whose shape does not match is
//! rejected (`spec.md` §8 property 1: type preservation).

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;
use crate::identifiers::AttributeName;

// ============================================================================
// SECTION: Time
// ============================================================================

/// A time-of-day value with hour/minute/second range invariants.
///
/// # Invariants
/// - `0 <= hour <= 24`, `0 <= minute < 60`, `0 <= second < 60` (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Time {
    /// Hour component, 0-24 inclusive.
    pub hour: u8,
    /// Minute component, 0-59.
    pub minute: u8,
    /// Second component, 0-59.
    pub second: u8,
}

impl Time {
    /// Builds a `Time`, validating range invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTime`] when a component is out of range.
    pub fn new(hour: u8, minute: u8, second: u8) -> Result<Self, ConfigError> {
        if hour > 24 || minute >= 60 || second >= 60 {
            return Err(ConfigError::InvalidTime {
                hour,
                minute,
                second,
            });
        }
        Ok(Self {
            hour,
            minute,
            second,
        })
    }

    /// Midnight, `00:00:00`.
    #[must_use]
    pub const fn midnight() -> Self {
        Self {
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    /// Canonical monotone integer encoding used for ordering and equality
    /// (`spec.md` §4.C): `second + (minute << 8) + (hour << 16)`.
    #[must_use]
    pub const fn to_int(self) -> i64 {
        (self.second as i64) + ((self.minute as i64) << 8) + ((self.hour as i64) << 16)
    }

    /// Formats as `HH:MM:SS`, matching the wire `time_str` field (`spec.md` §6).
    #[must_use]
    pub fn to_time_str(self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

// ============================================================================
// SECTION: Attribute Kind (declared shape)
// ============================================================================

/// The declared variant of an attribute, independent of its current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// Integer-valued attribute.
    Int,
    /// Floating point attribute.
    Float,
    /// String attribute.
    String,
    /// Boolean attribute.
    Bool,
    /// Time-of-day attribute.
    Time,
    /// Heterogeneous, possibly nested list attribute.
    List,
    /// Named-field dictionary attribute.
    Dict,
}

impl AttributeKind {
    /// Returns the default value for a freshly created attribute of this
    /// kind, matching the source language runtime's attribute defaults.
    #[must_use]
    pub fn default_value(self) -> AttributeValue {
        match self {
            Self::Int => AttributeValue::Int(0),
            Self::Float => AttributeValue::Float(0.0),
            Self::String => AttributeValue::String(String::new()),
            Self::Bool => AttributeValue::Bool(false),
            Self::Time => AttributeValue::Time(Time::midnight()),
            Self::List => AttributeValue::List(Vec::new()),
            Self::Dict => AttributeValue::Dict(BTreeMap::new()),
        }
    }

    /// Returns the kind of a runtime value, used to check inbound JSON
    /// against a declared attribute before accepting it.
    #[must_use]
    pub fn of(value: &AttributeValue) -> Self {
        match value {
            AttributeValue::Int(_) => Self::Int,
            AttributeValue::Float(_) => Self::Float,
            AttributeValue::String(_) => Self::String,
            AttributeValue::Bool(_) => Self::Bool,
            AttributeValue::Time(_) => Self::Time,
            AttributeValue::List(_) => Self::List,
            AttributeValue::Dict(_) => Self::Dict,
        }
    }
}

// ============================================================================
// SECTION: Attribute Value
// ============================================================================

/// A live attribute value. Numeric variants back history buffers; `List`
/// and `Dict` may nest arbitrarily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Boolean value.
    Bool(bool),
    /// Time-of-day value.
    Time(Time),
    /// Ordered, possibly heterogeneous and nested list.
    List(Vec<AttributeValue>),
    /// Named-field dictionary, values of any attribute type.
    Dict(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Returns the value as `f64` for numeric comparisons and history
    /// buffers. `Time` uses its canonical integer encoding (`spec.md`
    /// §4.C); `Bool`, `String`, `List`, and `Dict` have no numeric form.
    #[must_use]
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            #[allow(clippy::cast_precision_loss, reason = "history buffers are f64 samples")]
            Self::Float(v) => Some(*v),
            Self::Time(t) => Some(t.to_int() as f64),
            Self::Bool(_) | Self::String(_) | Self::List(_) | Self::Dict(_) => None,
        }
    }

    /// Renders the value the way it appears on the wire (`spec.md` §6):
    /// identical to the derived `Serialize` output except `Time`, which
    /// gains the informational `time_str` field alongside its three
    /// numeric components. Recurses into `List`/`Dict` so a nested `Time`
    /// gets the same treatment.
    #[must_use]
    pub fn to_wire_json(&self) -> serde_json::Value {
        match self {
            Self::Time(t) => serde_json::json!({
                "hour": t.hour,
                "minute": t.minute,
                "second": t.second,
                "time_str": t.to_time_str(),
            }),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_wire_json).collect()),
            Self::Dict(fields) => serde_json::Value::Object(
                fields.iter().map(|(key, value)| (key.clone(), value.to_wire_json())).collect(),
            ),
            Self::Int(_) | Self::Float(_) | Self::String(_) | Self::Bool(_) => {
                serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
            }
        }
    }
}

// ============================================================================
// SECTION: Attribute
// ============================================================================

/// A declared attribute of an [`crate::Entity`]: its name, kind, and
/// default value. Live values are tracked by `smauto-state`, not here —
/// see `smauto_core::StateReader`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name, unique within its parent entity.
    pub name: AttributeName,
    /// Declared variant.
    pub kind: AttributeKind,
    /// Initial value. Defaults to [`AttributeKind::default_value`] when
    /// omitted by the model.
    #[serde(default)]
    pub default: Option<AttributeValue>,
}

impl Attribute {
    /// Creates an attribute with the kind's standard default value.
    #[must_use]
    pub fn new(name: impl Into<AttributeName>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    /// Resolves the attribute's initial value.
    #[must_use]
    pub fn initial_value(&self) -> AttributeValue {
        self.default.clone().unwrap_or_else(|| self.kind.default_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_rejects_out_of_range_components() {
        assert!(Time::new(25, 0, 0).is_err());
        assert!(Time::new(0, 60, 0).is_err());
        assert!(Time::new(0, 0, 60).is_err());
        assert!(Time::new(24, 0, 0).is_ok());
    }

    #[test]
    fn time_encoding_is_monotone_within_a_day() {
        let early = Time::new(1, 0, 0).unwrap();
        let later = Time::new(1, 0, 1).unwrap();
        let next_minute = Time::new(1, 1, 0).unwrap();
        let next_hour = Time::new(2, 0, 0).unwrap();
        assert!(early.to_int() < later.to_int());
        assert!(later.to_int() < next_minute.to_int());
        assert!(next_minute.to_int() < next_hour.to_int());
    }

    #[test]
    fn attribute_kind_defaults_match_source_language_runtime() {
        assert_eq!(AttributeKind::Int.default_value(), AttributeValue::Int(0));
        assert_eq!(AttributeKind::Bool.default_value(), AttributeValue::Bool(false));
        assert_eq!(AttributeKind::String.default_value(), AttributeValue::String(String::new()));
    }
}
