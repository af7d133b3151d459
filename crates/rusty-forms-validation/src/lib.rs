//! rusty-forms validation predicates
//!
//! Pure functions over `&str` and numbers. They know nothing about fields,
//! forms or rule arguments; the rule registry in `rusty-forms` adapts JSON
//! values onto them.

pub mod email;
pub mod numeric;
pub mod pattern;
pub mod string;

// Re-export all validators
pub use email::*;
pub use numeric::*;
pub use pattern::*;
pub use string::*;
