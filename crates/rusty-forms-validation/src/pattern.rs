// File: src/pattern.rs
// Purpose: Regex-backed content validators

use once_cell::sync::Lazy;
use regex::Regex;

// Signed decimal without exponent: "42", "+42", "-.5", "3.14"
static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(?:[0-9]*[.])?[0-9]+$").unwrap()
});

static INT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[-+]?(?:0|[1-9][0-9]*))$").unwrap()
});

static FLOAT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[-+]?(?:[0-9]+))?(?:\.[0-9]*)?(?:[eE][\+\-]?(?:[0-9]+))?$").unwrap()
});

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+$").unwrap());

static ALPHANUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-Za-z]+$").unwrap());

static WORDS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z\s]+$").unwrap());

// Latin-1 supplement and Latin Extended-A letters on top of WORDS
static SPECIAL_WORDS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z\s\x{00C0}-\x{017F}]+$").unwrap()
});

/// Signed decimal number. Scientific notation is rejected.
pub fn is_numeric(value: &str) -> bool {
    NUMERIC_REGEX.is_match(value)
}

/// Signed integer without leading zeros
pub fn is_int(value: &str) -> bool {
    INT_REGEX.is_match(value)
}

/// Signed float, exponent allowed
pub fn is_float(value: &str) -> bool {
    FLOAT_REGEX.is_match(value)
}

pub fn is_alpha(value: &str) -> bool {
    ALPHA_REGEX.is_match(value)
}

pub fn is_alphanumeric(value: &str) -> bool {
    ALPHANUMERIC_REGEX.is_match(value)
}

/// Letters and whitespace only
pub fn is_words(value: &str) -> bool {
    WORDS_REGEX.is_match(value)
}

/// Letters, whitespace and accented Latin letters
pub fn is_special_words(value: &str) -> bool {
    SPECIAL_WORDS_REGEX.is_match(value)
}

/// Check if string matches regex pattern
///
/// An invalid pattern never matches.
pub fn matches_regex(value: &str, pattern: &str) -> bool {
    if let Ok(regex) = Regex::new(pattern) {
        regex.is_match(value)
    } else {
        false
    }
}
