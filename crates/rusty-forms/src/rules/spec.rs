// File: src/rules/spec.rs
// Purpose: Compile validation specs (shorthand text or rule maps) into RuleSpec

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FormError, Result};

/// Rule name a bare `required: true` compiles to.
pub const DEFAULT_REQUIRED_RULE: &str = "isDefaultRequiredValue";

/// Normalized rule name → argument mapping.
///
/// An argument of `true` means the rule takes no parameter. Insertion order is
/// kept so error messages come out in the order rules were written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSpec(IndexMap<String, Value>);

impl RuleSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// A spec holding one parameterless rule
    pub fn single(rule: impl Into<String>) -> Self {
        Self::new().with(rule, true)
    }

    /// Builder-style insert
    pub fn with(mut self, rule: impl Into<String>, arg: impl Into<Value>) -> Self {
        self.insert(rule, arg);
        self
    }

    /// Insert or replace a rule, keeping its original position on replace
    pub fn insert(&mut self, rule: impl Into<String>, arg: impl Into<Value>) {
        self.0.insert(rule.into(), arg.into());
    }

    pub fn get(&self, rule: &str) -> Option<&Value> {
        self.0.get(rule)
    }

    pub fn contains(&self, rule: &str) -> bool {
        self.0.contains_key(rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(rule, arg)| (rule.as_str(), arg))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RuleSpec {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut spec = RuleSpec::new();
        for (rule, arg) in iter {
            spec.insert(rule, arg);
        }
        spec
    }
}

/// Validation input as a caller writes it.
///
/// `"isNumeric,minLength:3"` and `{"isNumeric": true, "minLength": 3}` mean
/// the same thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationSpec {
    Text(String),
    Rules(RuleSpec),
}

impl From<&str> for ValidationSpec {
    fn from(text: &str) -> Self {
        ValidationSpec::Text(text.to_string())
    }
}

impl From<String> for ValidationSpec {
    fn from(text: String) -> Self {
        ValidationSpec::Text(text)
    }
}

impl From<RuleSpec> for ValidationSpec {
    fn from(rules: RuleSpec) -> Self {
        ValidationSpec::Rules(rules)
    }
}

/// The `required` input of a field: a flag, or a spec of required-rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequiredInput {
    Flag(bool),
    Spec(ValidationSpec),
}

impl RequiredInput {
    /// Whether this input marks the field as required at all, regardless of
    /// whether the current value satisfies it.
    pub fn is_set(&self) -> bool {
        match self {
            RequiredInput::Flag(flag) => *flag,
            RequiredInput::Spec(ValidationSpec::Text(text)) => !text.is_empty(),
            RequiredInput::Spec(ValidationSpec::Rules(_)) => true,
        }
    }
}

impl From<bool> for RequiredInput {
    fn from(flag: bool) -> Self {
        RequiredInput::Flag(flag)
    }
}

impl From<&str> for RequiredInput {
    fn from(text: &str) -> Self {
        RequiredInput::Spec(text.into())
    }
}

impl From<RuleSpec> for RequiredInput {
    fn from(rules: RuleSpec) -> Self {
        RequiredInput::Spec(rules.into())
    }
}

/// Compile a validation spec. Absent compiles to an empty spec and rule maps
/// pass through unchanged.
pub fn compile(spec: Option<&ValidationSpec>) -> Result<RuleSpec> {
    match spec {
        None => Ok(RuleSpec::new()),
        Some(ValidationSpec::Rules(rules)) => Ok(rules.clone()),
        Some(ValidationSpec::Text(text)) => compile_shorthand(text),
    }
}

/// Compile a `required` input. `true` becomes the default required rule,
/// `false` or absent an empty spec.
pub fn compile_required(required: Option<&RequiredInput>) -> Result<RuleSpec> {
    match required {
        Some(RequiredInput::Flag(true)) => Ok(RuleSpec::single(DEFAULT_REQUIRED_RULE)),
        Some(RequiredInput::Flag(false)) | None => Ok(RuleSpec::new()),
        Some(RequiredInput::Spec(spec)) => compile(Some(spec)),
    }
}

fn compile_shorthand(text: &str) -> Result<RuleSpec> {
    let mut rules = RuleSpec::new();

    for clause in split_clauses(text) {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }

        let mut segments = clause.split(':');
        let rule = segments.next().unwrap_or_default().trim();
        let mut args: Vec<Value> = segments.map(parse_argument).collect();

        if args.len() > 1 {
            return Err(FormError::MultipleArguments {
                rule: rule.to_string(),
                spec: text.to_string(),
            });
        }

        rules.insert(rule, args.pop().unwrap_or(Value::Bool(true)));
    }

    Ok(rules)
}

/// Splits on commas that are not inside `{}` or `[]`.
fn split_clauses(text: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                clauses.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    clauses.push(&text[start..]);
    clauses
}

/// JSON literal when it parses, the raw text otherwise.
fn parse_argument(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
