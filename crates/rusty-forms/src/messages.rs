// File: src/messages.rs
// Purpose: Error message resolution for failing rules

use std::collections::HashMap;

use crate::config::MessageConfig;

/// Message props of one field.
///
/// These only decide *which text* accompanies a failure; they never change
/// whether a field is valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMessages {
    /// Shown for an empty required field once the form was submitted
    pub required_error: Option<String>,
    /// Catch-all for failing rules of this field
    pub validation_error: Option<String>,
    /// Per-rule overrides
    pub validation_errors: HashMap<String, String>,
}

impl FieldMessages {
    /// Message for a failing rule.
    ///
    /// Lookup order: field per-rule, field catch-all, form per-rule, form
    /// catch-all. With nothing configured the rule name itself is returned as
    /// a message key for the presentation layer to translate.
    pub fn resolve_rule(&self, rule: &str, defaults: &MessageConfig) -> String {
        self.validation_errors
            .get(rule)
            .or(self.validation_error.as_ref())
            .or_else(|| defaults.rules.get(rule))
            .or(defaults.validation_error.as_ref())
            .cloned()
            .unwrap_or_else(|| rule.to_string())
    }

    /// Field-level message for a required-rule that fired, if one is set
    pub fn required_rule_message(&self, rule: &str) -> Option<String> {
        self.validation_errors.get(rule).cloned()
    }

    /// Fill unset props from the form's defaults
    pub(crate) fn inherit(&mut self, defaults: &MessageConfig) {
        if self.required_error.is_none() {
            self.required_error = defaults.required_error.clone();
        }
    }
}
