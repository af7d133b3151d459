// File: src/error.rs
// Purpose: Configuration errors raised by field and form calls

use thiserror::Error;

/// Authoring mistakes surfaced synchronously to the caller.
///
/// A rule that rejects a value is *not* an error: it shows up as field state
/// (`is_valid() == false` plus messages). These variants mean the form itself
/// is wired wrong and must not be swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// A field was created without a name.
    #[error("form input requires a name")]
    MissingName,

    /// A shorthand clause carried more than one `:`-delimited argument.
    #[error(
        "rule '{rule}' has multiple arguments in \"{spec}\"; string validations take one argument, use a rule mapping instead"
    )]
    MultipleArguments { rule: String, spec: String },

    /// A rule spec names a rule the registry does not know.
    #[error("unknown validation rule: {0}")]
    UnknownRule(String),

    /// External errors were addressed to a field name the form does not hold.
    #[error("no input named '{0}' is attached to this form")]
    UnknownField(String),
}

pub type Result<T, E = FormError> = std::result::Result<T, E>;
