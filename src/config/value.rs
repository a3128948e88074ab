//! Dynamic option values.
//!
//! A [`Value`] is both the example handed in through [`Defaults`](super::Defaults)
//! and the coerced result stored in a [`ResolvedConfig`](super::ResolvedConfig).

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::kind::{Opaque, ValueKind};

/// An option value: an example default or the result of coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Text(String),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Uuid(Uuid),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Kept sorted by rendered text and deduplicated, see [`Value::set`].
    Set(Vec<Value>),
}

impl Value {
    /// Builds a tuple value.
    pub fn tuple<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Builds a set value, normalising element order and dropping duplicates.
    pub fn set<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let mut items: Vec<Value> = items.into_iter().map(Into::into).collect();
        items.sort_by_cached_key(|item| (item.to_env_string(), item.rank()));
        let mut unique: Vec<Value> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Value::Set(unique)
    }

    /// Builds a mapping value.
    pub fn map<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Orders variants that render to the same text.
    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Text(_) => 2,
            Value::Integer(_) => 3,
            Value::Float(_) => 4,
            Value::Decimal(_) => 5,
            Value::Uuid(_) => 6,
            Value::List(_) => 7,
            Value::Tuple(_) => 8,
            Value::Map(_) => 9,
            Value::Set(_) => 10,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Value::List(_) | Value::Tuple(_) | Value::Map(_) | Value::Set(_)
        )
    }

    /// Returns the direct children of a container (mapping values for maps).
    pub fn children(&self) -> Vec<&Value> {
        match self {
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => items.iter().collect(),
            Value::Map(map) => map.values().collect(),
            _ => Vec::new(),
        }
    }

    /// Flattens a container into its scalar leaves, depth first.
    pub fn flatten(&self) -> Vec<&Value> {
        if !self.is_container() {
            return vec![self];
        }
        self.children()
            .into_iter()
            .flat_map(|child| child.flatten())
            .collect()
    }

    /// A container is flat when flattening leaves every direct child in place.
    pub fn is_flat(&self) -> bool {
        let children = self.children();
        children.iter().all(|child| !child.is_container())
            && children.len() == self.flatten().len()
    }

    /// Truthiness of the value: empty, zero and null values are falsy.
    pub fn is_falsy(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Text(s) => s.is_empty(),
            Value::Integer(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::Decimal(d) => d.is_zero(),
            Value::Uuid(_) => false,
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value in the textual form the environment reader accepts
    /// for this value's kind.
    ///
    /// Flat containers use the comma forms (`a,b`, `(a,b)`, `k=v,k2=v2`);
    /// nested containers fall back to JSON.
    pub fn to_env_string(&self) -> String {
        if self.is_container() && !self.is_flat() {
            return self.to_json().to_string();
        }
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Text(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Uuid(u) => u.hyphenated().to_string(),
            Value::List(items) | Value::Set(items) => join_items(items),
            Value::Tuple(items) => format!("({})", join_items(items)),
            Value::Map(map) => map
                .iter()
                .map(|(k, v)| format!("{k}={}", v.to_env_string()))
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Renders the value in the textual form read back for an option of `kind`.
    ///
    /// Structured options always render as JSON, whatever shape the value has.
    pub fn to_env_string_for(&self, kind: ValueKind) -> String {
        match kind {
            ValueKind::Opaque(Opaque::Structured) => self.to_json().to_string(),
            _ => self.to_env_string(),
        }
    }

    /// Converts to JSON. Decimals and UUIDs become strings; non-finite floats
    /// become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Text(s) => Json::String(s.clone()),
            Value::Integer(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Decimal(d) => Json::String(d.to_string()),
            Value::Uuid(u) => Json::String(u.hyphenated().to_string()),
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => {
                Json::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Converts from JSON. Arrays become lists and objects become maps.
    ///
    /// Returns `None` for integers outside the `i64` range.
    pub fn from_json(json: serde_json::Value) -> Option<Self> {
        use serde_json::Value as Json;

        let value = match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::String(s) => Value::Text(s),
            Json::Number(n) => match (n.as_i64(), n.is_f64()) {
                (Some(i), _) => Value::Integer(i),
                (None, true) => Value::Float(n.as_f64()?),
                (None, false) => return None,
            },
            Json::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(Value::from_json)
                    .collect::<Option<_>>()?,
            ),
            Json::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| Value::from_json(v).map(|v| (k, v)))
                    .collect::<Option<_>>()?,
            ),
        };
        Some(value)
    }
}

fn join_items(items: &[Value]) -> String {
    items
        .iter()
        .map(Value::to_env_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Text(s) => write!(f, "{s:?}"),
            other => f.write_str(&other.to_env_string()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

macro_rules! integer_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(i: $ty) -> Self {
                    Value::Integer(i64::from(i))
                }
            }
        )*
    };
}

integer_from!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl<V: Into<Value>> From<BTreeMap<String, V>> for Value {
    fn from(map: BTreeMap<String, V>) -> Self {
        Value::map(map)
    }
}
