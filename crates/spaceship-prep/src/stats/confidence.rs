//! Normal-approximation confidence intervals.
//!
//! Bounds are rounded to two decimal places.

use crate::columns;
use crate::error::{PreprocessingError, Result};
use crate::utils::{non_null_numeric_values, round2};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Confidence level used when callers have no preference.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Supported confidence levels and their two-sided z critical values.
const Z_TABLE: [(f64, f64); 3] = [(0.90, 1.645), (0.95, 1.96), (0.99, 2.576)];

/// A closed interval `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// z critical value for a confidence level (0.90, 0.95 or 0.99).
pub fn z_value(confidence: f64) -> Result<f64> {
    Z_TABLE
        .iter()
        .find(|(level, _)| (level - confidence).abs() < 1e-9)
        .map(|&(_, z)| z)
        .ok_or_else(|| {
            PreprocessingError::InvalidConfig(format!(
                "unsupported confidence level {}; expected 0.90, 0.95 or 0.99",
                confidence
            ))
        })
}

/// Confidence interval for the mean: `mean ± z * s / sqrt(n)`, with `s` the
/// sample standard deviation.
///
/// # Errors
///
/// [`PreprocessingError::InsufficientData`] with fewer than two values, and
/// [`PreprocessingError::InvalidConfig`] for an unsupported level.
pub fn mean_ci(data: &[f64], confidence: f64) -> Result<ConfidenceInterval> {
    let z = z_value(confidence)?;
    if data.len() < 2 {
        return Err(PreprocessingError::InsufficientData {
            needed: 2,
            found: data.len(),
        });
    }

    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let margin = z * variance.sqrt() / n.sqrt();

    Ok(ConfidenceInterval {
        lower: round2(mean - margin),
        upper: round2(mean + margin),
    })
}

/// [`mean_ci`] over the non-null values of a numeric column.
pub fn mean_ci_for_column(
    df: &DataFrame,
    column: &str,
    confidence: f64,
) -> Result<ConfidenceInterval> {
    let values = non_null_numeric_values(columns::require(df, column)?)?;
    if values.is_empty() {
        return Err(PreprocessingError::NoValidValues(column.to_string()));
    }
    mean_ci(&values, confidence)
}

/// Wald confidence interval for a proportion `successes / total`.
///
/// Returns `Ok(None)` when `total` is zero. At the boundaries (no successes,
/// or all successes) the margin uses a pseudo-proportion of `1/n` so the
/// interval does not collapse to a point; the bound at the boundary stays
/// exactly 0 or 1.
pub fn proportion_ci(
    successes: u64,
    total: u64,
    confidence: f64,
) -> Result<Option<ConfidenceInterval>> {
    if total == 0 {
        return Ok(None);
    }
    if successes > total {
        return Err(PreprocessingError::InvalidConfig(format!(
            "successes ({}) cannot exceed total ({})",
            successes, total
        )));
    }
    let z = z_value(confidence)?;

    let n = total as f64;
    let boundary_margin = || {
        let p = 1.0 / n;
        z * (p * (1.0 - p) / n).sqrt()
    };

    let interval = if successes == 0 {
        ConfidenceInterval {
            lower: 0.0,
            upper: round2(boundary_margin()),
        }
    } else if successes == total {
        ConfidenceInterval {
            lower: round2(1.0 - boundary_margin()),
            upper: 1.0,
        }
    } else {
        let p = successes as f64 / n;
        let margin = z * (p * (1.0 - p) / n).sqrt();
        ConfidenceInterval {
            lower: round2(p - margin),
            upper: round2(p + margin),
        }
    };

    Ok(Some(interval))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn ci(lower: f64, upper: f64) -> ConfidenceInterval {
        ConfidenceInterval { lower, upper }
    }

    #[test]
    fn test_z_value() {
        assert_eq!(z_value(0.95).unwrap(), 1.96);
        assert_eq!(z_value(0.90).unwrap(), 1.645);
        assert_eq!(z_value(0.99).unwrap(), 2.576);
        assert!(matches!(z_value(0.8), Err(PreprocessingError::InvalidConfig(_))));
    }

    #[test]
    fn test_mean_ci() {
        let interval = mean_ci(&[10.0, 12.0, 11.0, 13.0, 9.0], 0.95).unwrap();
        assert_eq!(interval, ci(9.61, 12.39));
        assert!(interval.contains(11.0));
    }

    #[test]
    fn test_mean_ci_wider_at_higher_confidence() {
        let data = [10.0, 12.0, 11.0, 13.0, 9.0];
        let interval = mean_ci(&data, 0.99).unwrap();
        assert_eq!(interval, ci(9.18, 12.82));
        assert!(interval.width() > mean_ci(&data, 0.95).unwrap().width());
    }

    #[test]
    fn test_mean_ci_constant_data() {
        assert_eq!(mean_ci(&[4.0, 4.0, 4.0], 0.95).unwrap(), ci(4.0, 4.0));
    }

    #[test]
    fn test_mean_ci_needs_two_values() {
        let err = mean_ci(&[1.0], 0.95).unwrap_err();
        assert!(matches!(
            err,
            PreprocessingError::InsufficientData { needed: 2, found: 1 }
        ));
        assert!(mean_ci(&[], 0.95).is_err());
    }

    #[test]
    fn test_mean_ci_for_column_skips_nulls() {
        let df = df![
            "Age" => [Some(10.0), None, Some(12.0), Some(11.0), Some(13.0), Some(9.0)],
        ]
        .unwrap();

        assert_eq!(mean_ci_for_column(&df, "Age", 0.95).unwrap(), ci(9.61, 12.39));
    }

    #[test]
    fn test_mean_ci_for_empty_column() {
        let df = df!["Age" => [None::<f64>, None]].unwrap();

        let err = mean_ci_for_column(&df, "Age", 0.95).unwrap_err();
        assert!(matches!(err, PreprocessingError::NoValidValues(_)));
        assert!(mean_ci_for_column(&df, "Missing", 0.95).is_err());
    }

    #[test]
    fn test_proportion_ci_empty_total() {
        assert_eq!(proportion_ci(0, 0, 0.95).unwrap(), None);
        assert_eq!(proportion_ci(7, 0, 0.95).unwrap(), None);
    }

    #[test]
    fn test_proportion_ci_boundaries() {
        assert_eq!(proportion_ci(0, 100, 0.95).unwrap(), Some(ci(0.0, 0.02)));
        assert_eq!(proportion_ci(100, 100, 0.95).unwrap(), Some(ci(0.98, 1.0)));
    }

    #[test]
    fn test_proportion_ci_wald() {
        assert_eq!(proportion_ci(25, 100, 0.95).unwrap(), Some(ci(0.17, 0.33)));
        assert_eq!(proportion_ci(50, 100, 0.95).unwrap(), Some(ci(0.4, 0.6)));
    }

    #[test]
    fn test_proportion_ci_rejects_excess_successes() {
        assert!(matches!(
            proportion_ci(5, 4, 0.95),
            Err(PreprocessingError::InvalidConfig(_))
        ));
    }
}
