// crates/smauto-core/src/identifiers.rs
// ============================================================================
// Module: SmAuto Identifiers
// Description: Newtype identifiers for entities, attributes, automations,
//              and brokers.
// Purpose: Avoid passing bare `String`s across crate boundaries so a mixed-up
//          argument order is a type error, not a runtime bug.
// Dependencies: serde, std
// ============================================================================

//! ## Overview
//! Identifiers are opaque, cheaply-cloneable wrappers over `String`. They
//! serialize transparently so model files (`smauto-config`) can still use
//! plain strings on the wire.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

macro_rules! string_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from anything string-like.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(EntityName, "Stable name of an [`crate::Entity`].");
string_id!(AttributeName, "Name of an [`crate::Attribute`] within its parent entity.");
string_id!(AutomationName, "Stable name of an [`crate::Automation`].");
string_id!(BrokerName, "Stable name of a [`crate::Broker`].");
