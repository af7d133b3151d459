// File: src/rules/registry.rs
// Purpose: Named rule predicates

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::error::{FormError, Result};

/// A rule predicate: `(value, argument) -> passes`.
///
/// Predicates must be pure. The argument is `true` for rules written without
/// a parameter.
pub type Predicate = dyn Fn(&Value, &Value) -> bool;

/// Rule name → predicate table.
///
/// [`RuleRegistry::new`] starts with the built-in rules; further rules are
/// added only through [`RuleRegistry::register`], typically before the
/// registry is handed to a form.
pub struct RuleRegistry {
    rules: HashMap<String, Box<Predicate>>,
}

impl RuleRegistry {
    /// Registry with the built-in rules installed
    pub fn new() -> Self {
        let mut registry = Self::empty();
        super::builtin::install(&mut registry);
        registry
    }

    /// Registry with no rules at all
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Add a rule, replacing any rule already registered under `name`
    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&Value, &Value) -> bool + 'static,
    {
        let name = name.into();
        if self.rules.insert(name.clone(), Box::new(predicate)).is_some() {
            tracing::debug!(rule = %name, "replaced validation rule");
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Run one rule. Unregistered names are a configuration error.
    pub fn evaluate(&self, name: &str, value: &Value, arg: &Value) -> Result<bool> {
        let predicate = self
            .rules
            .get(name)
            .ok_or_else(|| FormError::UnknownRule(name.to_string()))?;
        let passed = predicate(value, arg);
        tracing::trace!(rule = name, %value, %arg, passed, "evaluated rule");
        Ok(passed)
    }

    /// Registered rule names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_registry_knows_nothing() {
        let registry = RuleRegistry::empty();
        assert!(!registry.has("isNumeric"));
        assert_eq!(
            registry.evaluate("isNumeric", &json!("1"), &json!(true)),
            Err(FormError::UnknownRule("isNumeric".to_string()))
        );
    }

    #[test]
    fn test_register_and_evaluate() {
        let mut registry = RuleRegistry::empty();
        registry.register("isEven", |value, _| {
            value.as_i64().map(|n| n % 2 == 0).unwrap_or(false)
        });

        assert!(registry.has("isEven"));
        assert_eq!(registry.evaluate("isEven", &json!(4), &json!(true)), Ok(true));
        assert_eq!(registry.evaluate("isEven", &json!(3), &json!(true)), Ok(false));
    }

    #[test]
    fn test_register_replaces_existing_rule() {
        let mut registry = RuleRegistry::new();
        registry.register("isNumeric", |_, _| false);
        assert_eq!(registry.evaluate("isNumeric", &json!(1), &json!(true)), Ok(false));
    }

    #[test]
    fn test_argument_reaches_predicate() {
        let mut registry = RuleRegistry::empty();
        registry.register("startsWith", |value, arg| {
            match (value.as_str(), arg.as_str()) {
                (Some(value), Some(prefix)) => value.starts_with(prefix),
                _ => false,
            }
        });
        assert_eq!(
            registry.evaluate("startsWith", &json!("user_1"), &json!("user_")),
            Ok(true)
        );
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = RuleRegistry::empty();
        registry.register("b", |_, _| true);
        registry.register("a", |_, _| true);
        assert_eq!(registry.names(), vec!["a", "b"]);
    }
}
