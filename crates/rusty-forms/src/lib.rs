//! # rusty-forms
//!
//! Validation coordination for forms: fields register with a form, the form
//! runs their rules through a shared registry, and both sides answer
//! validity, pristine and error-message queries.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use rusty_forms::{FieldProps, Form, FormConfig};
//!
//! let form = Rc::new(Form::new(FormConfig::default().with_required_error("Required")));
//!
//! let email = form
//!     .field(FieldProps::new("email").validations("isEmail").required(true))
//!     .unwrap();
//! let age = form
//!     .field(FieldProps::new("age").value("42").validations("isInt,min:18"))
//!     .unwrap();
//!
//! assert!(!form.is_form_valid());
//! assert!(age.is_valid());
//!
//! email.set_value("ada@example.com").unwrap();
//! let submission = form.submit();
//! assert!(submission.valid);
//! assert_eq!(submission.model["age"], "42");
//! ```
//!
//! ## Rule specs
//!
//! Rules are named predicates in a [`RuleRegistry`]. A field lists them
//! either as shorthand text (`"isInt,minLength:3"`) or as a map of rule name
//! to argument. Required-ness is a separate spec; a required-rule that
//! *passes* means the field is missing its value.
//!
//! ## Configuration
//!
//! [`FormConfig`] loads form-wide message defaults and behaviour from a
//! `forms.toml`:
//!
//! ```toml
//! [messages]
//! validation_error = "This value is invalid"
//! required_error = "This field is required"
//!
//! [messages.rules]
//! isEmail = "Enter a valid email"
//!
//! [form]
//! revalidation = "skip_unchanged"
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod form;
pub mod messages;
pub mod rules;
pub mod value;

pub use config::{FormConfig, FormSettings, MessageConfig, RevalidationPolicy};
pub use error::{FormError, Result};
pub use field::{Field, FieldId, FieldNode, FieldProps, Validation};
pub use form::{Form, FormContext, FormEvent, ListenerId, Submission};
pub use messages::FieldMessages;
pub use rules::{
    compile, compile_required, Predicate, RequiredInput, RuleRegistry, RuleSpec, ValidationSpec,
    DEFAULT_REQUIRED_RULE,
};
pub use value::ValueExt;

// Re-export the predicate crate for custom rules built on the same checks
pub use rusty_forms_validation as checks;
