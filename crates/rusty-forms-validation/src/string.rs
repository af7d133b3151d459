//! String validation functions
//!
//! Lengths count characters, not bytes, so "ü" has length 1.

/// Character count of a string
pub fn char_length(s: &str) -> usize {
    s.chars().count()
}

/// Exact equality
pub fn equals(value: &str, expected: &str) -> bool {
    value == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_length() {
        assert_eq!(char_length("hello"), 5);
        assert_eq!(char_length("über"), 4);
        assert_eq!(char_length(""), 0);
    }

    #[test]
    fn test_equality() {
        assert!(equals("test", "test"));
        assert!(!equals("test", "other"));
    }
}
