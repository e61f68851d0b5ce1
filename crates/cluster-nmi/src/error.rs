//! Error types for NMI evaluation.
//!
//! Configuration and alignment errors are fatal for a whole batch. Model load
//! and prediction errors are caught by the batch driver and isolated to the
//! model that produced them.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading inputs or scoring models.
#[derive(Debug, Error)]
pub enum EvalError {
    /// IO error reading a file or directory
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Malformed record in a line-oriented input file
    #[error("Parse error in {} at line {line}: {reason}", .path.display())]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// Parser message
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Item and vector sources do not line up
    #[error("Alignment error: {0}")]
    Alignment(String),

    /// A model artifact could not be deserialized
    #[error("Failed to load model '{name}': {reason}")]
    ModelLoad {
        /// Artifact name
        name: String,
        /// Reason for the failure
        reason: String,
    },

    /// Feature vector dimension does not match the model
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the model was trained on
        expected: usize,
        /// Dimension of the offending vector
        actual: usize,
    },

    /// Empty input provided
    #[error("Empty input: {0}")]
    EmptyInput(String),
}

/// Result alias used throughout the crate.
pub type EvalResult<T> = Result<T, EvalError>;

impl From<config::ConfigError> for EvalError {
    fn from(err: config::ConfigError) -> Self {
        EvalError::Config(err.to_string())
    }
}

impl EvalError {
    /// Whether this error should abort the whole batch rather than a single model.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            EvalError::ModelLoad { .. } | EvalError::DimensionMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_message_includes_path() {
        let err = EvalError::Io {
            path: PathBuf::from("data/items.jsonl"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let msg = err.to_string();
        assert!(msg.contains("data/items.jsonl"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_model_errors_are_not_fatal() {
        let load = EvalError::ModelLoad {
            name: "kmeans_1.cm".into(),
            reason: "bad json".into(),
        };
        let dim = EvalError::DimensionMismatch {
            expected: 3,
            actual: 2,
        };
        assert!(!load.is_fatal());
        assert!(!dim.is_fatal());
        assert!(EvalError::Alignment("x".into()).is_fatal());
        assert!(EvalError::Config("x".into()).is_fatal());
    }
}
