//! Numeric validation functions

/// Validates minimum value for numeric types
pub fn at_least<T: PartialOrd>(value: T, min: T) -> bool {
    value >= min
}

/// Validates maximum value for numeric types
pub fn at_most<T: PartialOrd>(value: T, max: T) -> bool {
    value <= max
}

/// Parses a trimmed decimal string the way a form input would hold it
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_validation() {
        assert!(at_least(10, 5));
        assert!(at_least(5, 5));
        assert!(!at_least(3, 5));

        assert!(at_least(18.5, 18.0));
        assert!(!at_least(17.9, 18.0));
    }

    #[test]
    fn test_max_validation() {
        assert!(at_most(5, 10));
        assert!(at_most(10, 10));
        assert!(!at_most(15, 10));

        assert!(at_most(99.9, 100.0));
        assert!(!at_most(100.1, 100.0));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("-0.5"), Some(-0.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
    }
}
