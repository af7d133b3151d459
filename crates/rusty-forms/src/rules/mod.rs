//! Rule registry and rule-spec compilation

mod builtin;
pub mod registry;
pub mod spec;

pub use registry::{Predicate, RuleRegistry};
pub use spec::{compile, compile_required, RequiredInput, RuleSpec, ValidationSpec, DEFAULT_REQUIRED_RULE};
