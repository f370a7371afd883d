use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// A key produced by a dimension extractor.
///
/// `Null` is an ordinary key: records whose attribute is unset land in the
/// `Null` bucket and can be filtered for explicitly.
#[derive(Debug, Clone)]
pub enum FilterValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Set(BTreeSet<FilterValue>),
}

impl FilterValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Boolean(_) => "BOOLEAN",
            Self::Integer(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Text(_) => "TEXT",
            Self::Set(_) => "SET",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Parse a command-line token: `null`, `true`/`false`, integers and
    /// floats get their typed value, anything else is text.
    pub fn parse_literal(token: &str) -> Self {
        match token {
            "null" => return Self::Null,
            "true" => return Self::Boolean(true),
            "false" => return Self::Boolean(false),
            _ => {}
        }
        if let Ok(i) = token.parse::<i64>() {
            return Self::Integer(i);
        }
        if let Ok(f) = token.parse::<f64>()
            && f.is_finite()
        {
            return Self::Float(f);
        }
        Self::Text(token.to_string())
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Boolean(_) => 1,
            Self::Integer(_) => 2,
            Self::Float(_) => 3,
            Self::Text(_) => 4,
            Self::Set(_) => 5,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Boolean(b) => JsonValue::Bool(*b),
            Self::Integer(i) => JsonValue::from(*i),
            // Non-finite floats have no JSON form
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::Text(s) => JsonValue::String(s.clone()),
            Self::Set(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

impl Ord for FilterValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Set(a), Self::Set(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for FilterValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality follows `total_cmp` so that Eq, Ord and Hash agree for floats.
impl PartialEq for FilterValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FilterValue {}

impl Hash for FilterValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Null => {}
            Self::Boolean(b) => b.hash(state),
            Self::Integer(i) => i.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::Text(s) => s.hash(state),
            Self::Set(items) => {
                items.len().hash(state);
                for item in items {
                    item.hash(state);
                }
            }
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(fl) => write!(f, "{}", fl),
            Self::Text(s) => write!(f, "{}", s),
            Self::Set(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&JsonValue> for FilterValue {
    fn from(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Boolean(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Null),
            },
            JsonValue::String(s) => Self::Text(s.clone()),
            JsonValue::Array(items) => Self::Set(items.iter().map(Self::from).collect()),
            JsonValue::Object(_) => Self::Text(json.to_string()),
        }
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for FilterValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for FilterValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        Ok(Self::from(&json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_total_order_across_types() {
        let mut values = vec![
            FilterValue::Text("a".into()),
            FilterValue::Integer(3),
            FilterValue::Null,
            FilterValue::Boolean(true),
            FilterValue::Float(0.5),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                FilterValue::Null,
                FilterValue::Boolean(true),
                FilterValue::Integer(3),
                FilterValue::Float(0.5),
                FilterValue::Text("a".into()),
            ]
        );
    }

    #[test]
    fn test_integer_and_float_are_distinct_keys() {
        assert_ne!(FilterValue::Integer(1), FilterValue::Float(1.0));

        let mut keys = HashSet::new();
        keys.insert(FilterValue::Integer(1));
        keys.insert(FilterValue::Float(1.0));
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_nan_is_a_usable_key() {
        let mut keys = HashSet::new();
        keys.insert(FilterValue::Float(f64::NAN));
        assert!(keys.contains(&FilterValue::Float(f64::NAN)));
    }

    #[test]
    fn test_from_json() {
        assert_eq!(FilterValue::from(&json!(null)), FilterValue::Null);
        assert_eq!(FilterValue::from(&json!(7)), FilterValue::Integer(7));
        assert_eq!(FilterValue::from(&json!(2.5)), FilterValue::Float(2.5));
        assert_eq!(FilterValue::from(&json!("ACTIVE")), FilterValue::from("ACTIVE"));

        let set = FilterValue::from(&json!(["b", "a", "b"]));
        let expected: BTreeSet<FilterValue> = ["a", "b"].into_iter().map(FilterValue::from).collect();
        assert_eq!(set, FilterValue::Set(expected));
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(FilterValue::parse_literal("null"), FilterValue::Null);
        assert_eq!(FilterValue::parse_literal("false"), FilterValue::Boolean(false));
        assert_eq!(FilterValue::parse_literal("42"), FilterValue::Integer(42));
        assert_eq!(FilterValue::parse_literal("1.5"), FilterValue::Float(1.5));
        assert_eq!(FilterValue::parse_literal("NaN"), FilterValue::from("NaN"));
        assert_eq!(FilterValue::parse_literal("ON_HOLD"), FilterValue::from("ON_HOLD"));
    }
}
