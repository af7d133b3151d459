//! Email and URL shape validation

use once_cell::sync::Lazy;
use regex::Regex;

// http, https or ftp scheme followed by a host-ish first character
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:https?|ftp)://[^\s/$.?#][^\s]*$").unwrap()
});

/// Validates basic email format
///
/// Checks for:
/// - Exactly one '@' symbol
/// - Content before and after '@'
/// - At least one '.' in the domain, no leading/trailing dot or hyphen
/// - A top-level domain of two or more characters
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if domain.contains('@') {
        return false;
    }

    if local.is_empty() || local.len() > 64 {
        return false;
    }

    if domain.is_empty() || domain.len() > 255 || !domain.contains('.') {
        return false;
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
        || domain.contains("..")
    {
        return false;
    }

    let valid_local_chars =
        |c: char| c.is_alphanumeric() || c == '.' || c == '_' || c == '-' || c == '+';
    if !local.chars().all(valid_local_chars) {
        return false;
    }

    let valid_domain_chars = |c: char| c.is_alphanumeric() || c == '.' || c == '-';
    if !domain.chars().all(valid_domain_chars) {
        return false;
    }

    match domain.rfind('.') {
        Some(pos) => domain[pos + 1..].chars().count() >= 2,
        None => false,
    }
}

/// Validate URL format
pub fn is_valid_url(url: &str) -> bool {
    URL_REGEX.is_match(url)
}
