use serde_json::{Number, Value};

/// Applies `scalar` to every element of an array, failing the whole value if
/// any element fails.
fn each(raw: &Value, scalar: fn(&Value) -> Option<Value>) -> Option<Value> {
    match raw {
        Value::Array(items) => items
            .iter()
            .map(scalar)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        other => scalar(other),
    }
}

/// `"string"`: anything scalar becomes its text; `null` becomes `""`.
#[must_use]
pub fn string_mapper(raw: &Value) -> Option<Value> {
    each(raw, |value| {
        Some(Value::String(match value {
            Value::Null => String::new(),
            Value::String(text) => text.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            structured => structured.to_string(),
        }))
    })
}

/// `"number"`: integers stay integers, finite decimals become floats.
/// Text with trailing junk (`"12abc"`) fails.
#[must_use]
pub fn number_mapper(raw: &Value) -> Option<Value> {
    each(raw, |value| match value {
        Value::Number(n) => Some(Value::Number(n.clone())),
        Value::String(text) => {
            let text = text.trim();
            if let Ok(int) = text.parse::<i64>() {
                return Some(Value::from(int));
            }
            text.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .and_then(Number::from_f64)
                .map(Value::Number)
        }
        _ => None,
    })
}

/// `"boolean"`: `true`/`false` (any case) and `1`/`0`.
#[must_use]
pub fn boolean_mapper(raw: &Value) -> Option<Value> {
    each(raw, |value| match value {
        Value::Bool(b) => Some(Value::Bool(*b)),
        Value::String(text) => {
            let text = text.trim();
            if text.eq_ignore_ascii_case("true") || text == "1" {
                Some(Value::Bool(true))
            } else if text.eq_ignore_ascii_case("false") || text == "0" {
                Some(Value::Bool(false))
            } else {
                None
            }
        }
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(Value::Bool(true)),
            Some(0) => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    })
}

/// `"json"`: text is parsed, already-structured values pass through.
#[must_use]
pub fn json_mapper(raw: &Value) -> Option<Value> {
    each(raw, |value| match value {
        Value::String(text) => serde_json::from_str(text).ok(),
        other => Some(other.clone()),
    })
}
