//! Error types for comparator evaluation and registration.

/// Result alias used throughout the crate.
pub type Result<T, E = CompareError> = std::result::Result<T, E>;

/// Errors raised while registering or evaluating comparators.
///
/// A missing field is never an error: matchers report it as a plain `false`.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("Invalid comparator name {0:?}: expected one or more word characters")]
    InvalidName(String),
    #[error("Unknown comparator: {0}")]
    UnknownComparator(String),
    #[error("{name}() expects {expected} argument(s), got {got}")]
    Arity {
        name: &'static str,
        expected: &'static str,
        got: usize,
    },
    #[error("Cannot order {left} against {right}")]
    Unorderable { left: String, right: String },
    #[error("Argument of type {0} is not a container")]
    NotAContainer(String),
    #[error("Object of type {0} has no length")]
    Unsized(String),
    #[error("{op} expects {expected}, got {got}")]
    TypeMismatch {
        op: &'static str,
        expected: &'static str,
        got: String,
    },
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Failed to parse expectations: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Failed to parse expectations: {0}")]
    Json(#[from] serde_json::Error),
    /// Raised by user-registered predicates.
    #[error("{0}")]
    Custom(String),
}

impl CompareError {
    /// Build a [`CompareError::Custom`] from any message.
    pub fn custom(message: impl Into<String>) -> Self {
        CompareError::Custom(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CompareError::Arity {
            name: "within",
            expected: "2",
            got: 1,
        };
        assert_eq!(err.to_string(), "within() expects 2 argument(s), got 1");

        let err = CompareError::Unorderable {
            left: "string".to_string(),
            right: "number".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot order string against number");

        assert_eq!(CompareError::custom("boom").to_string(), "boom");
    }

    #[test]
    fn test_pattern_error_from_regex() {
        let err: CompareError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, CompareError::Pattern(_)));
        assert!(err.to_string().starts_with("Invalid pattern"));
    }
}
