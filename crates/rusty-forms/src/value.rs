// File: src/value.rs
// Purpose: Field value helpers over serde_json::Value

use serde_json::{Map, Value};
use std::borrow::Cow;

/// Read helpers shared by rule predicates and the form model.
pub trait ValueExt {
    /// `true` only for the empty string.
    fn is_empty_string(&self) -> bool;

    /// `null` or the empty string: the value a required field starts from.
    fn is_unset(&self) -> bool;

    /// Text a string rule should look at. Numbers render without a trailing
    /// `.0`, booleans as `true`/`false`. `null`, arrays and objects have none.
    fn display_text(&self) -> Option<Cow<'_, str>>;

    /// Characters of a string or items of an array.
    fn length(&self) -> Option<usize>;

    /// A number, or a string holding one.
    fn numeric_value(&self) -> Option<f64>;

    /// Scalar equality that lets `42` equal `"42"`.
    fn loose_eq(&self, other: &Value) -> bool;
}

impl ValueExt for Value {
    fn is_empty_string(&self) -> bool {
        matches!(self, Value::String(s) if s.is_empty())
    }

    fn is_unset(&self) -> bool {
        self.is_null() || self.is_empty_string()
    }

    fn display_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => {
                // Format number nicely (remove .0 for integers)
                let text = match n.as_f64() {
                    Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                        format!("{}", f as i64)
                    }
                    _ => n.to_string(),
                };
                Some(Cow::Owned(text))
            }
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn length(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(rusty_forms_validation::char_length(s)),
            Value::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    fn numeric_value(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => rusty_forms_validation::parse_number(s),
            _ => None,
        }
    }

    fn loose_eq(&self, other: &Value) -> bool {
        if self == other {
            return true;
        }
        match (self.numeric_value(), other.numeric_value()) {
            (Some(a), Some(b)) if self.is_number() || other.is_number() => a == b,
            _ => match (self.display_text(), other.display_text()) {
                (Some(a), Some(b)) => rusty_forms_validation::equals(&a, &b),
                _ => false,
            },
        }
    }
}

/// Splits `address.street` or `items[0][name]` into path segments.
pub fn path_segments(name: &str) -> Vec<&str> {
    name.split(|c| c == '.' || c == '[' || c == ']')
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Inserts `value` into `target` under a nested field path.
///
/// Intermediate non-object values are replaced by objects; a later write to
/// the same path overwrites an earlier one.
pub fn insert_path(target: &mut Map<String, Value>, name: &str, value: Value) {
    let segments = path_segments(name);
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = target;
    for segment in parents {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(map) = slot else {
            return;
        };
        current = map;
    }
    current.insert(last.to_string(), value);
}
