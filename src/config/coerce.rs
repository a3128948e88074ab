//! Per-kind coercion of raw environment text.
//!
//! Each [`ValueKind`] maps to exactly one [`Coercer`]. A coercer returns
//! `None` when the text does not parse under its kind.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::kind::{element_kind, Opaque, ValueKind};
use super::value::Value;

/// Parses raw text, using the example value for shape hints.
pub(crate) type Coercer = fn(&str, &Value) -> Option<Value>;

const TRUTHY: &[&str] = &["true", "on", "ok", "y", "yes", "1"];
const FALSY: &[&str] = &["false", "off", "n", "no", "0", ""];

/// Looks up the coercer for a kind. Unsupported kinds have none.
pub(crate) fn coercer_for(kind: ValueKind) -> Option<Coercer> {
    let coercer: Coercer = match kind {
        ValueKind::Boolean => coerce_bool,
        ValueKind::Text => coerce_text,
        ValueKind::Integer => coerce_integer,
        ValueKind::Float => coerce_float,
        ValueKind::Decimal => coerce_decimal,
        ValueKind::Identifier => coerce_uuid,
        ValueKind::FlatList => coerce_list,
        ValueKind::FlatTuple => coerce_tuple,
        ValueKind::FlatMapping => coerce_mapping,
        ValueKind::FlatSet => coerce_set,
        ValueKind::Opaque(Opaque::Structured) => coerce_json,
        ValueKind::Opaque(Opaque::Unsupported) => return None,
    };
    Some(coercer)
}

fn coerce_bool(raw: &str, _example: &Value) -> Option<Value> {
    let token = raw.trim().to_ascii_lowercase();
    if TRUTHY.contains(&token.as_str()) {
        return Some(Value::Bool(true));
    }
    if FALSY.contains(&token.as_str()) {
        return Some(Value::Bool(false));
    }
    token.parse::<i64>().ok().map(|n| Value::Bool(n != 0))
}

fn coerce_text(raw: &str, _example: &Value) -> Option<Value> {
    Some(Value::Text(raw.to_string()))
}

fn coerce_integer(raw: &str, _example: &Value) -> Option<Value> {
    raw.trim().parse().ok().map(Value::Integer)
}

fn coerce_float(raw: &str, _example: &Value) -> Option<Value> {
    raw.trim().parse().ok().map(Value::Float)
}

fn coerce_decimal(raw: &str, _example: &Value) -> Option<Value> {
    Decimal::from_str(raw.trim()).ok().map(Value::Decimal)
}

fn coerce_uuid(raw: &str, _example: &Value) -> Option<Value> {
    Uuid::parse_str(raw.trim()).ok().map(Value::Uuid)
}

fn coerce_list(raw: &str, example: &Value) -> Option<Value> {
    coerce_items(raw, example).map(Value::List)
}

fn coerce_tuple(raw: &str, example: &Value) -> Option<Value> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed);
    coerce_items(inner, example).map(Value::Tuple)
}

fn coerce_set(raw: &str, example: &Value) -> Option<Value> {
    coerce_items(raw, example).map(Value::set)
}

fn coerce_mapping(raw: &str, example: &Value) -> Option<Value> {
    let coerce = element_coercer(example.children());
    let mut map = BTreeMap::new();
    for pair in split_items(raw) {
        let (key, value) = pair.split_once('=')?;
        map.insert(key.trim().to_string(), coerce(value.trim(), &Value::Null)?);
    }
    Some(Value::Map(map))
}

fn coerce_json(raw: &str, example: &Value) -> Option<Value> {
    let parsed: serde_json::Value = serde_json::from_str(raw).ok()?;
    if !(parsed.is_array() || parsed.is_object()) {
        return None;
    }
    // Only the top-level shape survives JSON; inner tuples and sets come back as lists.
    Some(match (example, Value::from_json(parsed)?) {
        (Value::Tuple(_), Value::List(items)) => Value::Tuple(items),
        (Value::Set(_), Value::List(items)) => Value::set(items),
        (_, value) => value,
    })
}

fn coerce_items(raw: &str, example: &Value) -> Option<Vec<Value>> {
    let coerce = element_coercer(example.children());
    split_items(raw)
        .into_iter()
        .map(|item| coerce(item, &Value::Null))
        .collect()
}

fn split_items(raw: &str) -> Vec<&str> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::trim).collect()
}

/// Elements are coerced by the example's shared scalar kind, or as text.
fn element_coercer<'a>(items: impl IntoIterator<Item = &'a Value>) -> Coercer {
    element_kind(items)
        .and_then(coercer_for)
        .unwrap_or(coerce_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::kind::classify;

    fn coerce(raw: &str, example: impl Into<Value>) -> Option<Value> {
        let example = example.into();
        let coercer = coercer_for(classify(&example)).expect("supported kind");
        coercer(raw, &example)
    }

    #[test]
    fn test_bool_tokens() {
        assert_eq!(coerce("false", true), Some(Value::Bool(false)));
        assert_eq!(coerce(" Yes ", false), Some(Value::Bool(true)));
        assert_eq!(coerce("off", true), Some(Value::Bool(false)));
        assert_eq!(coerce("2", false), Some(Value::Bool(true)));
        assert_eq!(coerce("maybe", true), None);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(coerce(" 8080 ", 8000), Some(Value::Integer(8080)));
        assert_eq!(coerce("notanumber", 8000), None);
        assert_eq!(coerce("2.5", 1.0), Some(Value::Float(2.5)));
        assert_eq!(
            coerce("10.25", Decimal::ONE),
            Some(Value::Decimal(Decimal::new(1025, 2)))
        );
    }

    #[test]
    fn test_uuid() {
        let id = Uuid::from_u128(0x1234);
        assert_eq!(coerce(&id.to_string(), Uuid::nil()), Some(Value::Uuid(id)));
        assert_eq!(coerce("not-a-uuid", Uuid::nil()), None);
    }

    #[test]
    fn test_list_uses_element_kind() {
        assert_eq!(coerce("1, 2,3", vec![8000]), Some(Value::from(vec![1, 2, 3])));
        assert_eq!(coerce("a,b", vec!["x"]), Some(Value::from(vec!["a", "b"])));
        assert_eq!(coerce("a,b", Vec::<Value>::new()), Some(Value::from(vec!["a", "b"])));
        assert_eq!(coerce("1,x", vec![8000]), None);
        assert_eq!(coerce("", vec!["x"]), Some(Value::List(vec![])));
    }

    #[test]
    fn test_tuple_strips_parentheses() {
        assert_eq!(coerce("(a,b)", Value::tuple(["x"])), Some(Value::tuple(["a", "b"])));
        assert_eq!(coerce("a,b", Value::tuple(["x"])), Some(Value::tuple(["a", "b"])));
        assert_eq!(coerce("()", Value::tuple(["x"])), Some(Value::tuple(Vec::<Value>::new())));
    }

    #[test]
    fn test_set_deduplicates() {
        assert_eq!(coerce("b,a,b", Value::set(["x"])), Some(Value::set(["a", "b"])));
    }

    #[test]
    fn test_mapping() {
        assert_eq!(
            coerce("a=1, b=2", Value::map([("x", 0)])),
            Some(Value::map([("a", 1), ("b", 2)]))
        );
        assert_eq!(coerce("a", Value::map([("x", 0)])), None);
    }

    #[test]
    fn test_structured_json() {
        let example = Value::List(vec![Value::from(vec![1])]);
        assert_eq!(
            coerce("[[1,2],[3]]", example.clone()),
            Some(Value::List(vec![Value::from(vec![1, 2]), Value::from(vec![3])]))
        );
        assert_eq!(coerce("[[1", example), None);

        let tuple_example = Value::tuple([Value::from(vec![1])]);
        assert_eq!(
            coerce("[[1]]", tuple_example),
            Some(Value::tuple([Value::from(vec![1])]))
        );
    }

    #[test]
    fn test_structured_requires_container() {
        let example = Value::List(vec![Value::from(vec![1])]);
        assert_eq!(coerce("5", example.clone()), None);
        assert_eq!(coerce("\"text\"", example.clone()), None);
        assert_eq!(coerce("null", example.clone()), None);
        assert_eq!(coerce("[18446744073709551615]", example), None);
    }

    #[test]
    fn test_structured_flat_input_round_trips() {
        let example = Value::List(vec![Value::from(vec![1])]);
        let kind = classify(&example);
        let coercer = coercer_for(kind).unwrap();

        let coerced = coercer("[1,2,3]", &example).unwrap();
        assert_eq!(coerced, Value::from(vec![1, 2, 3]));

        let text = coerced.to_env_string_for(kind);
        assert_eq!(text, "[1,2,3]");
        assert_eq!(coercer(&text, &example), Some(coerced));
    }

    #[test]
    fn test_unsupported_has_no_coercer() {
        assert!(coercer_for(ValueKind::Opaque(Opaque::Unsupported)).is_none());
    }

    #[test]
    fn test_round_trip_through_env_string() {
        let examples = [
            Value::from(true),
            Value::from("hello world"),
            Value::from(-42),
            Value::from(3.25),
            Value::Decimal(Decimal::new(-1999, 3)),
            Value::Uuid(Uuid::from_u128(7)),
            Value::from(vec![1, 2]),
            Value::tuple(["a", "b"]),
            Value::map([("k", true)]),
            Value::set([3, 1]),
            Value::List(vec![Value::map([("a", 1)])]),
        ];
        for value in examples {
            let kind = classify(&value);
            let coercer = coercer_for(kind).unwrap();
            let parsed = coercer(&value.to_env_string_for(kind), &value);
            assert_eq!(parsed.as_ref(), Some(&value), "round trip of {kind}");
            assert_eq!(classify(parsed.as_ref().unwrap()), kind);
        }
    }
}
