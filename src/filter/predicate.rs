use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::core::FilterValue;

/// Test applied to one dimension's extracted value.
///
/// An empty `OneOf` matches nothing; it is an explicit empty-result filter,
/// not a pass-through. Equality follows what a predicate matches, so
/// `Equals(x)` and `OneOf({x})` compare equal.
#[derive(Debug, Clone)]
pub enum Predicate {
    Equals(FilterValue),
    OneOf(BTreeSet<FilterValue>),
}

impl Predicate {
    pub fn equals(value: impl Into<FilterValue>) -> Self {
        Self::Equals(value.into())
    }

    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        Self::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, value: &FilterValue) -> bool {
        match self {
            Self::Equals(expected) => expected == value,
            Self::OneOf(allowed) => allowed.contains(value),
        }
    }

    /// Filter-map shape: arrays are membership tests, anything else is equality.
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Array(items) => Self::OneOf(items.iter().map(FilterValue::from).collect()),
            other => Self::Equals(FilterValue::from(other)),
        }
    }

    /// Inverse of `from_json`. A bare `null` would read back as "no filter",
    /// so equality with `Null` is written as `[null]`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Equals(FilterValue::Null) => JsonValue::Array(vec![JsonValue::Null]),
            Self::Equals(value) => value.to_json(),
            Self::OneOf(values) => JsonValue::Array(values.iter().map(FilterValue::to_json).collect()),
        }
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Equals(a), Self::Equals(b)) => a == b,
            (Self::OneOf(a), Self::OneOf(b)) => a == b,
            (Self::Equals(value), Self::OneOf(set)) | (Self::OneOf(set), Self::Equals(value)) => {
                set.len() == 1 && set.contains(value)
            }
        }
    }
}

impl Eq for Predicate {}

// Hashes the accepted values, consistent with the equality above.
impl Hash for Predicate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Equals(value) => {
                state.write_usize(1);
                value.hash(state);
            }
            Self::OneOf(values) => {
                state.write_usize(values.len());
                for value in values {
                    value.hash(state);
                }
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(value) => write!(f, "= {}", value),
            Self::OneOf(values) => {
                write!(f, "IN (")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Predicate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        Ok(Self::from_json(&json))
    }
}
