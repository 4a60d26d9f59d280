//! Custom error types for the passenger preprocessing pipeline.
//!
//! This module provides the error hierarchy using `thiserror`.
//!
//! Two classes of failure exist. Precondition failures (a required column is
//! absent) surface as [`PreprocessingError::ColumnNotFound`]. Missing values
//! inside present columns are always recovered by the stages and never reach
//! this type.
//!
//! Errors are serializable as `{ code, message }` so callers can forward them
//! over IPC or into JSON logs unchanged.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// The main error type for the preprocessing pipeline.
#[derive(Error, Debug)]
pub enum PreprocessingError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration or argument provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No valid values found in a column for computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Not enough observations for a statistic.
    #[error("Insufficient data: need at least {needed} values, found {found}")]
    InsufficientData { needed: usize, found: usize },

    /// Type conversion failed.
    #[error("Failed to convert column '{column}' to {target_type}: {reason}")]
    TypeConversionFailed {
        column: String,
        target_type: String,
        reason: String,
    },

    /// A cell value does not have the expected shape.
    #[error("Malformed value '{value}' in column '{column}' at row {row}: {reason}")]
    MalformedValue {
        column: String,
        row: usize,
        value: String,
        reason: String,
    },

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreprocessingError>,
    },
}

impl PreprocessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreprocessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for callers that branch on the failure kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::TypeConversionFailed { .. } => "TYPE_CONVERSION_FAILED",
            Self::MalformedValue { .. } => "MALFORMED_VALUE",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is a missing-column precondition failure.
    ///
    /// Context wrappers are looked through.
    pub fn is_precondition_failure(&self) -> bool {
        match self {
            Self::ColumnNotFound(_) => true,
            Self::WithContext { source, .. } => source.is_precondition_failure(),
            _ => false,
        }
    }
}

impl From<ConfigValidationError> for PreprocessingError {
    fn from(err: ConfigValidationError) -> Self {
        PreprocessingError::InvalidConfig(err.to_string())
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PreprocessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreprocessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Polars(e).with_context(context))
    }
}
