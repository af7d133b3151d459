// File: src/config.rs
// Purpose: Form configuration, parsed from forms.toml or built in code

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Configuration handed to a [`Form`](crate::Form) at construction.
///
/// Fields inherit the message defaults below unless their own props override
/// them; nothing here is process-wide.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FormConfig {
    #[serde(default)]
    pub messages: MessageConfig,

    #[serde(default)]
    pub form: FormSettings,
}

/// Default error messages
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MessageConfig {
    /// Message for any failing rule without a more specific one
    #[serde(default)]
    pub validation_error: Option<String>,

    /// Message shown for an empty required field after submit
    #[serde(default)]
    pub required_error: Option<String>,

    /// Per-rule messages, keyed by rule name
    #[serde(default)]
    pub rules: HashMap<String, String>,
}

/// Form behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormSettings {
    /// Whether the form starts disabled
    #[serde(default = "default_false")]
    pub disabled: bool,

    #[serde(default)]
    pub revalidation: RevalidationPolicy,
}

/// When a field's validation request actually re-runs its rules
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RevalidationPolicy {
    /// Every request re-runs the rules
    #[default]
    Always,
    /// Skip when value and rule specs deep-equal those of the last run
    SkipUnchanged,
}

fn default_false() -> bool {
    false
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            disabled: false,
            revalidation: RevalidationPolicy::default(),
        }
    }
}

impl FormConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // A missing file means defaults
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from default path (./forms.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("forms.toml")
    }

    /// Parse configuration from TOML text; blank text means defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: FormConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Builder: default message for failing rules
    pub fn with_validation_error(mut self, message: impl Into<String>) -> Self {
        self.messages.validation_error = Some(message.into());
        self
    }

    /// Builder: default required-field message
    pub fn with_required_error(mut self, message: impl Into<String>) -> Self {
        self.messages.required_error = Some(message.into());
        self
    }

    /// Builder: default message for one rule
    pub fn with_rule_error(mut self, rule: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.rules.insert(rule.into(), message.into());
        self
    }

    /// Builder: revalidation policy
    pub fn with_revalidation(mut self, policy: RevalidationPolicy) -> Self {
        self.form.revalidation = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = FormConfig::default();
        assert!(!config.form.disabled);
        assert_eq!(config.form.revalidation, RevalidationPolicy::Always);
        assert_eq!(config.messages.validation_error, None);
        assert_eq!(config.messages.required_error, None);
        assert!(config.messages.rules.is_empty());
    }

    #[test]
    fn test_empty_config() {
        let config = FormConfig::from_toml_str("  \n").unwrap();
        assert_eq!(config, FormConfig::default());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
            [messages]
            validation_error = "Invalid value"
            required_error = "This field is required"

            [messages.rules]
            isEmail = "Not an email"

            [form]
            disabled = true
            revalidation = "skip_unchanged"
        "#;
        let config = FormConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.messages.validation_error.as_deref(), Some("Invalid value"));
        assert_eq!(
            config.messages.required_error.as_deref(),
            Some("This field is required")
        );
        assert_eq!(
            config.messages.rules.get("isEmail").map(String::as_str),
            Some("Not an email")
        );
        assert!(config.form.disabled);
        assert_eq!(config.form.revalidation, RevalidationPolicy::SkipUnchanged);
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let toml = r#"
            [form]
            revalidation = "sometimes"
        "#;
        assert!(FormConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = FormConfig::load("definitely/not/here/forms.toml").unwrap();
        assert_eq!(config, FormConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "rusty-forms-config-{}.toml",
            std::process::id()
        ));
        fs::write(&path, "[messages]\nrequired_error = \"Required\"\n").unwrap();

        let config = FormConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.messages.required_error.as_deref(), Some("Required"));
    }

    #[test]
    fn test_builders() {
        let config = FormConfig::default()
            .with_validation_error("Bad")
            .with_required_error("Needed")
            .with_rule_error("isInt", "Whole numbers only")
            .with_revalidation(RevalidationPolicy::SkipUnchanged);

        assert_eq!(config.messages.validation_error.as_deref(), Some("Bad"));
        assert_eq!(config.messages.required_error.as_deref(), Some("Needed"));
        assert_eq!(config.messages.rules["isInt"], "Whole numbers only");
        assert_eq!(config.form.revalidation, RevalidationPolicy::SkipUnchanged);
    }
}
