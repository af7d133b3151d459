// File: src/rules/builtin.rs
// Purpose: Built-in rules installed into every RuleRegistry::new()
//
// Content rules pass on an unset value (null or ""): whether a field must be
// filled in is the required-rule's job, not theirs.

use rusty_forms_validation as checks;
use serde_json::Value;

use super::registry::RuleRegistry;
use super::spec::DEFAULT_REQUIRED_RULE;
use crate::value::ValueExt;

pub(crate) fn install(registry: &mut RuleRegistry) {
    // Presence
    registry.register(DEFAULT_REQUIRED_RULE, |value, _| value.is_unset());
    registry.register("isExisty", |value, _| !value.is_null());
    registry.register("isUndefined", |value, _| value.is_null());
    registry.register("isEmptyString", |value, _| value.is_empty_string());
    registry.register("isTrue", |value, _| *value == Value::Bool(true));
    registry.register("isFalse", |value, _| *value == Value::Bool(false));

    // Shape
    registry.register("isNumeric", |value, _| {
        value.is_number() || text_rule(value, checks::is_numeric)
    });
    registry.register("isInt", |value, _| text_rule(value, checks::is_int));
    registry.register("isFloat", |value, _| text_rule(value, checks::is_float));
    registry.register("isAlpha", |value, _| text_rule(value, checks::is_alpha));
    registry.register("isAlphanumeric", |value, _| {
        text_rule(value, checks::is_alphanumeric)
    });
    registry.register("isWords", |value, _| text_rule(value, checks::is_words));
    registry.register("isSpecialWords", |value, _| {
        text_rule(value, checks::is_special_words)
    });
    registry.register("isEmail", |value, _| text_rule(value, checks::is_valid_email));
    registry.register("isUrl", |value, _| text_rule(value, checks::is_valid_url));
    registry.register("matchRegexp", |value, arg| match arg.as_str() {
        Some(pattern) => text_rule(value, |text| checks::matches_regex(text, pattern)),
        None => false,
    });

    // Length
    registry.register("isLength", |value, arg| {
        length_rule(value, arg, |len, length| len == length)
    });
    registry.register("minLength", |value, arg| {
        length_rule(value, arg, |len, min| len >= min)
    });
    // null passes, but "" is measured like any other string
    registry.register("maxLength", |value, arg| {
        value.is_null()
            || match (value.length(), arg_usize(arg)) {
                (Some(len), Some(max)) => len <= max,
                _ => false,
            }
    });

    // Comparison
    registry.register("equals", |value, arg| value.is_unset() || value.loose_eq(arg));
    registry.register("min", |value, arg| number_rule(value, arg, checks::at_least));
    registry.register("max", |value, arg| number_rule(value, arg, checks::at_most));
}

/// Applies a string check to the value's text. Unset passes; values with no
/// text form (arrays, objects) fail.
fn text_rule(value: &Value, check: impl Fn(&str) -> bool) -> bool {
    if value.is_unset() {
        return true;
    }
    value.display_text().map(|text| check(&text)).unwrap_or(false)
}

fn length_rule<L>(value: &Value, arg: &Value, check: L) -> bool
where
    L: Fn(usize, usize) -> bool,
{
    if value.is_unset() {
        return true;
    }
    match (value.length(), arg_usize(arg)) {
        (Some(len), Some(bound)) => check(len, bound),
        _ => false,
    }
}

fn number_rule(value: &Value, arg: &Value, check: fn(f64, f64) -> bool) -> bool {
    if value.is_unset() {
        return true;
    }
    match (value.numeric_value(), arg.numeric_value()) {
        (Some(n), Some(bound)) => check(n, bound),
        _ => false,
    }
}

/// Non-negative integer argument, given as a number or numeric text
fn arg_usize(arg: &Value) -> Option<usize> {
    match arg {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
