//! Statistical helpers for exploring passenger data.
//!
//! These are independent of the preprocessor and operate on plain slices or
//! single columns.

pub mod confidence;
pub mod outliers;

pub use confidence::{
    ConfidenceInterval, DEFAULT_CONFIDENCE, mean_ci, mean_ci_for_column, proportion_ci, z_value,
};
pub use outliers::{IqrBounds, OutlierDetector};
