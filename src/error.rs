//! Error types and handling for simplebench
//!
//! This module defines the crate error type used by configuration, the
//! registry, the orchestrator and persistence, plus the narrower error a
//! single test body invocation can produce.

use std::any::Any;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error type accepted from user test bodies
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for simplebench operations
#[derive(Debug, Error)]
pub enum SimpleBenchError {
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        field: Option<String>,
    },

    #[error("Cannot open group '{inner}' inside group '{outer}': groups cannot be nested")]
    NestedGroup { outer: String, inner: String },

    #[error("Ungrouped tests cannot be mixed with named groups ({})", .groups.join(", "))]
    MixedGrouping { groups: Vec<String> },

    #[error("Test '{test}' failed: {source}")]
    TestFailed {
        test: String,
        group: Option<String>,
        #[source]
        source: BodyError,
    },

    #[error("Persistence error: {message}")]
    PersistenceError {
        message: String,
        path: PathBuf,
        #[source]
        source: Option<BoxError>,
    },

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, SimpleBenchError>;

impl From<std::io::Error> for SimpleBenchError {
    fn from(err: std::io::Error) -> Self {
        SimpleBenchError::IoError {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl SimpleBenchError {
    /// Shorthand for a configuration error tied to a config key
    pub fn config(message: impl Into<String>, field: impl Into<String>) -> Self {
        SimpleBenchError::ConfigError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Errors caused by how the suite was set up rather than by a test body
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SimpleBenchError::ConfigError { .. }
                | SimpleBenchError::NestedGroup { .. }
                | SimpleBenchError::MixedGrouping { .. }
        )
    }
}

/// Failure of a single test body invocation
#[derive(Debug, Error)]
pub enum BodyError {
    /// The body reported an error through its completion handle
    #[error("{0}")]
    Failed(#[source] BoxError),

    /// The body panicked while being called
    #[error("test body panicked: {0}")]
    Panicked(String),

    /// The completion handle was dropped without being completed
    #[error("completion handle dropped without signalling completion")]
    Abandoned,
}

impl BodyError {
    /// Wrap any error reported by a test body
    pub fn failed(err: impl Into<BoxError>) -> Self {
        BodyError::Failed(err.into())
    }

    /// Convert a caught panic payload into an error
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        BodyError::Panicked(message)
    }
}
