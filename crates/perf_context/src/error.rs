//! Error types for context profiling.

use thiserror::Error;

/// Errors that can occur while configuring or driving the profiler.
#[derive(Debug, Error)]
pub enum ProfilerError {
    /// Failed to parse a configuration document
    #[error("Invalid profiler configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// An operation needed a context but got the empty identifier
    #[error("Context identifier must not be empty")]
    EmptyContext,
}

/// Result type for profiler operations.
pub type ProfilerResult<T> = Result<T, ProfilerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProfilerError::EmptyContext;
        assert_eq!(err.to_string(), "Context identifier must not be empty");
    }

    #[test]
    fn test_serde_error_conversion() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ProfilerError = json_err.into();
        assert!(matches!(err, ProfilerError::Config(_)));
        assert!(err.to_string().starts_with("Invalid profiler configuration"));
    }
}
