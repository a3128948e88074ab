//! Classification of example values into value kinds.

use std::fmt;

use super::value::Value;

/// Opaque kinds: either round-tripped as structured data or not readable at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opaque {
    /// Nested containers, read from the environment as JSON.
    Structured,
    /// No environment coercion exists; the example is kept as-is.
    Unsupported,
}

/// The kind assigned to an option, derived from its example value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Text,
    Integer,
    Float,
    Decimal,
    Identifier,
    FlatList,
    FlatTuple,
    FlatMapping,
    FlatSet,
    Opaque(Opaque),
}

impl ValueKind {
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            ValueKind::Boolean
                | ValueKind::Text
                | ValueKind::Integer
                | ValueKind::Float
                | ValueKind::Decimal
                | ValueKind::Identifier
        )
    }

    pub fn is_supported(self) -> bool {
        self != ValueKind::Opaque(Opaque::Unsupported)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Decimal => "decimal",
            ValueKind::Identifier => "uuid",
            ValueKind::FlatList => "list",
            ValueKind::FlatTuple => "tuple",
            ValueKind::FlatMapping => "mapping",
            ValueKind::FlatSet => "set",
            ValueKind::Opaque(Opaque::Structured) => "json",
            ValueKind::Opaque(Opaque::Unsupported) => "unsupported value",
        };
        f.write_str(name)
    }
}

/// Classifies an example value.
///
/// Total over [`Value`]: containers that hold other containers are
/// [`Opaque::Structured`], and `Null` is [`Opaque::Unsupported`].
pub fn classify(example: &Value) -> ValueKind {
    match example {
        Value::Bool(_) => ValueKind::Boolean,
        Value::Text(_) => ValueKind::Text,
        Value::Integer(_) => ValueKind::Integer,
        Value::Float(_) => ValueKind::Float,
        Value::Decimal(_) => ValueKind::Decimal,
        Value::Uuid(_) => ValueKind::Identifier,
        nested if nested.is_container() && !nested.is_flat() => {
            ValueKind::Opaque(Opaque::Structured)
        }
        Value::List(_) => ValueKind::FlatList,
        Value::Tuple(_) => ValueKind::FlatTuple,
        Value::Map(_) => ValueKind::FlatMapping,
        Value::Set(_) => ValueKind::FlatSet,
        Value::Null => ValueKind::Opaque(Opaque::Unsupported),
    }
}

/// The shared scalar kind of a container's elements, if they all agree.
pub(crate) fn element_kind<'a>(items: impl IntoIterator<Item = &'a Value>) -> Option<ValueKind> {
    let mut kinds = items.into_iter().map(classify);
    let first = kinds.next()?;
    (first.is_scalar() && kinds.all(|kind| kind == first)).then_some(first)
}
