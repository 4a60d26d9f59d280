//! Configuration types for the passenger preprocessing pipeline.
//!
//! This module provides configuration options using the builder pattern.
//! The defaults describe the Spaceship Titanic schema; overriding them is
//! meant for renamed columns, not for arbitrary datasets.

use crate::columns::{BINARY_COLUMNS, CATEGORICAL_COLUMNS, SPENDING_COLUMNS};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default sentinel for missing categorical values.
pub const DEFAULT_CATEGORICAL_SENTINEL: &str = "Unknown";

/// Default sentinel for missing cabins, in `Deck/Number/Side` form.
pub const DEFAULT_CABIN_SENTINEL: &str = "Unknown/0/Unknown";

/// How the cabin decomposer treats a value that does not split into
/// exactly three parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MalformedCabinPolicy {
    /// Fail the transform with a `MalformedValue` error.
    #[default]
    Error,
    /// Decompose the row as if the cabin were missing.
    Unknown,
}

/// Configuration for the preprocessing pipeline.
///
/// Use [`PreprocessorConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use spaceship_prep::config::{MalformedCabinPolicy, PreprocessorConfig};
///
/// let config = PreprocessorConfig::builder()
///     .malformed_cabin(MalformedCabinPolicy::Unknown)
///     .categorical_sentinel("Missing")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessorConfig {
    /// Spending columns encoded into `{col}_cat` indicators and summed
    /// into `ServiceCount`.
    /// Default: RoomService, FoodCourt, ShoppingMall, Spa, VRDeck
    pub spending_columns: Vec<String>,

    /// Nullable boolean columns normalized to 0/1.
    /// Default: CryoSleep, VIP
    pub binary_columns: Vec<String>,

    /// Categorical columns whose nulls are filled with the sentinel.
    /// Default: HomePlanet, Destination
    pub categorical_columns: Vec<String>,

    /// Fill value for missing categorical values.
    /// Default: "Unknown"
    pub categorical_sentinel: String,

    /// Fill value for missing cabins before decomposition.
    /// Default: "Unknown/0/Unknown"
    pub cabin_sentinel: String,

    /// Handling of cabins that do not have exactly three parts.
    /// Default: Error
    pub malformed_cabin: MalformedCabinPolicy,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self {
            spending_columns: to_owned_names(&SPENDING_COLUMNS),
            binary_columns: to_owned_names(&BINARY_COLUMNS),
            categorical_columns: to_owned_names(&CATEGORICAL_COLUMNS),
            categorical_sentinel: DEFAULT_CATEGORICAL_SENTINEL.to_string(),
            cabin_sentinel: DEFAULT_CABIN_SENTINEL.to_string(),
            malformed_cabin: MalformedCabinPolicy::default(),
        }
    }
}

fn to_owned_names(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl PreprocessorConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PreprocessorConfigBuilder {
        PreprocessorConfigBuilder::default()
    }

    /// Parse and validate a configuration from JSON.
    ///
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PreprocessorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        validate_columns("spending_columns", &self.spending_columns)?;
        validate_columns("binary_columns", &self.binary_columns)?;
        validate_columns("categorical_columns", &self.categorical_columns)?;

        if self.categorical_sentinel.is_empty() {
            return Err(ConfigValidationError::EmptySentinel {
                field: "categorical_sentinel".to_string(),
            });
        }

        let parts = self.cabin_sentinel.split('/').count();
        if parts != 3 {
            return Err(ConfigValidationError::InvalidCabinSentinel {
                value: self.cabin_sentinel.clone(),
                parts,
            });
        }

        Ok(())
    }
}

fn validate_columns(
    field: &str,
    columns: &[String],
) -> std::result::Result<(), ConfigValidationError> {
    if columns.is_empty() {
        return Err(ConfigValidationError::EmptyColumnList {
            field: field.to_string(),
        });
    }

    let mut seen = HashSet::new();
    for column in columns {
        if column.is_empty() {
            return Err(ConfigValidationError::EmptyColumnName {
                field: field.to_string(),
            });
        }
        if !seen.insert(column.as_str()) {
            return Err(ConfigValidationError::DuplicateColumn {
                field: field.to_string(),
                column: column.clone(),
            });
        }
    }

    Ok(())
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("'{field}' must name at least one column")]
    EmptyColumnList { field: String },

    #[error("'{field}' contains an empty column name")]
    EmptyColumnName { field: String },

    #[error("'{field}' lists column '{column}' more than once")]
    DuplicateColumn { field: String, column: String },

    #[error("'{field}' must not be empty")]
    EmptySentinel { field: String },

    #[error("Invalid cabin sentinel '{value}': expected 3 '/'-separated parts, found {parts}")]
    InvalidCabinSentinel { value: String, parts: usize },
}

/// Builder for [`PreprocessorConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PreprocessorConfigBuilder {
    spending_columns: Option<Vec<String>>,
    binary_columns: Option<Vec<String>>,
    categorical_columns: Option<Vec<String>>,
    categorical_sentinel: Option<String>,
    cabin_sentinel: Option<String>,
    malformed_cabin: Option<MalformedCabinPolicy>,
}

impl PreprocessorConfigBuilder {
    /// Set the spending columns.
    pub fn spending_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spending_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the boolean columns normalized to 0/1.
    pub fn binary_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.binary_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the categorical columns filled with the sentinel.
    pub fn categorical_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the fill value for missing categorical values.
    pub fn categorical_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.categorical_sentinel = Some(sentinel.into());
        self
    }

    /// Set the fill value for missing cabins.
    ///
    /// Must have the `Deck/Number/Side` shape.
    pub fn cabin_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.cabin_sentinel = Some(sentinel.into());
        self
    }

    /// Set how malformed cabin values are handled.
    pub fn malformed_cabin(mut self, policy: MalformedCabinPolicy) -> Self {
        self.malformed_cabin = Some(policy);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PreprocessorConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<PreprocessorConfig, ConfigValidationError> {
        let defaults = PreprocessorConfig::default();
        let config = PreprocessorConfig {
            spending_columns: self.spending_columns.unwrap_or(defaults.spending_columns),
            binary_columns: self.binary_columns.unwrap_or(defaults.binary_columns),
            categorical_columns: self.categorical_columns.unwrap_or(defaults.categorical_columns),
            categorical_sentinel: self
                .categorical_sentinel
                .unwrap_or(defaults.categorical_sentinel),
            cabin_sentinel: self.cabin_sentinel.unwrap_or(defaults.cabin_sentinel),
            malformed_cabin: self.malformed_cabin.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
