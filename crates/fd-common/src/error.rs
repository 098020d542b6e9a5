//! Error types for the failure-detector benchmark.

use thiserror::Error;

/// Result type alias for fd-bench operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for fd-bench.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parameters `{first}` and `{second}` cannot both be array-typed")]
    ArrayAxisConflict { first: String, second: String },

    #[error("window capacity must be a positive integer, got {value}")]
    InvalidCapacity { value: String },

    // Trace errors (20-29)
    #[error("empty arrival trace")]
    EmptyTrace,

    #[error("trace error: {0}")]
    Trace(String),

    // Extension program errors (30-39)
    #[error("extension program error: {0}")]
    Extension(String),

    // Arithmetic errors (40-49)
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    // I/O errors (50-59)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for exit codes and detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::ArrayAxisConflict { .. } => 11,
            Error::InvalidCapacity { .. } => 12,
            Error::EmptyTrace => 20,
            Error::Trace(_) => 21,
            Error::Extension(_) => 30,
            Error::Arithmetic(_) => 40,
            Error::Io(_) => 50,
            Error::Json(_) => 51,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_group_bands() {
        assert_eq!(Error::Config("x".into()).code(), 10);
        assert_eq!(
            Error::ArrayAxisConflict {
                first: "n".into(),
                second: "phi".into()
            }
            .code(),
            11
        );
        assert_eq!(Error::EmptyTrace.code(), 20);
        assert_eq!(Error::Extension("missing EA".into()).code(), 30);
        assert_eq!(Error::Arithmetic("zero variance".into()).code(), 40);
    }

    #[test]
    fn display_includes_parameter_names() {
        let err = Error::ArrayAxisConflict {
            first: "window".into(),
            second: "phi".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("window"));
        assert!(msg.contains("phi"));
    }
}
