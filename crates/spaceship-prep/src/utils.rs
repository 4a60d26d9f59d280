//! Shared utilities for the preprocessing stages.
//!
//! This module contains the Series helpers used across stages and the
//! statistics module: dtype checks, null filling, value extraction and
//! frequency counting.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is boolean.
#[inline]
pub fn is_boolean_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Boolean)
}

// =============================================================================
// Value Extraction Utilities
// =============================================================================

/// Read a column as optional f64 values.
///
/// Numeric and boolean columns are cast, and NaN reads as missing. A column
/// with no non-null values
/// reads as all-null whatever its dtype, since CSV readers type an
/// empty column as String. Any other dtype is a conversion error.
pub fn numeric_values(series: &Series) -> Result<Vec<Option<f64>>> {
    let dtype = series.dtype();
    if series.null_count() == series.len() {
        return Ok(vec![None; series.len()]);
    }
    if !is_numeric_dtype(dtype) && !is_boolean_dtype(dtype) {
        return Err(PreprocessingError::TypeConversionFailed {
            column: series.name().to_string(),
            target_type: "Float64".to_string(),
            reason: format!("column has non-numeric dtype {}", dtype),
        });
    }

    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Non-null f64 values of a column, in row order.
pub fn non_null_numeric_values(series: &Series) -> Result<Vec<f64>> {
    Ok(numeric_values(series)?.into_iter().flatten().collect())
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always Float64.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> Result<Series> {
    let filled: Vec<f64> = numeric_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a Series with a string, casting it to String first.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let as_string = series.cast(&DataType::String)?;
    let filled: Vec<&str> = as_string
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

/// Count how often each non-null value occurs.
///
/// Built in one pass over the complete column so lookups afterwards see
/// whole-table frequencies.
pub fn frequency_map<'a, I>(values: I) -> HashMap<&'a str, i64>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts: HashMap<&'a str, i64> = HashMap::new();
    for value in values.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

/// Round to two decimal places, half away from zero.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Tests
// =============================================================================
