//! IQR-based outlier flagging.

use crate::columns;
use crate::error::{PreprocessingError, Result};
use crate::utils::numeric_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Quartiles and Tukey fences of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Fence distance in IQRs.
    pub const MULTIPLIER: f64 = 1.5;

    /// Compute bounds from a sample. Returns `None` when the sample has no
    /// values other than NaN.
    ///
    /// Quartiles interpolate linearly between order statistics at position
    /// `q * (n - 1)`.
    pub fn from_values(values: &[f64]) -> Result<Option<Self>> {
        let observed: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let sample = Float64Chunked::from_slice("sample".into(), &observed);

        let q1 = sample.quantile(0.25, QuantileMethod::Linear)?;
        let q3 = sample.quantile(0.75, QuantileMethod::Linear)?;
        let (Some(q1), Some(q3)) = (q1, q3) else {
            return Ok(None);
        };
        let iqr = q3 - q1;

        Ok(Some(Self {
            q1,
            q3,
            iqr,
            lower: q1 - Self::MULTIPLIER * iqr,
            upper: q3 + Self::MULTIPLIER * iqr,
        }))
    }

    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Flags values outside the IQR fences of a column.
pub struct OutlierDetector;

impl OutlierDetector {
    /// IQR bounds over the non-null values of a numeric column.
    pub fn bounds(df: &DataFrame, column: &str) -> Result<IqrBounds> {
        let values = numeric_values(columns::require(df, column)?)?;
        let observed: Vec<f64> = values.into_iter().flatten().collect();
        IqrBounds::from_values(&observed)?
            .ok_or_else(|| PreprocessingError::NoValidValues(column.to_string()))
    }

    /// Int64 series named `{column}_outlier`: 1 outside the fences, 0 inside.
    /// Nulls are never outliers.
    pub fn flag_iqr(df: &DataFrame, column: &str) -> Result<Series> {
        let values = numeric_values(columns::require(df, column)?)?;
        let observed: Vec<f64> = values.iter().flatten().copied().collect();
        let bounds = IqrBounds::from_values(&observed)?
            .ok_or_else(|| PreprocessingError::NoValidValues(column.to_string()))?;

        let flags: Vec<i64> = values
            .iter()
            .map(|v| v.is_some_and(|x| bounds.is_outlier(x)) as i64)
            .collect();
        let outliers: i64 = flags.iter().sum();

        debug!(
            "Column '{}': {} outliers outside [{:.2}, {:.2}]",
            column, outliers, bounds.lower, bounds.upper
        );

        Ok(Series::new(format!("{}_outlier", column).into(), flags))
    }

    /// Append the `{column}_outlier` flag to the table. Returns the number of
    /// outliers.
    pub fn add_outlier_flag(df: &mut DataFrame, column: &str) -> Result<usize> {
        let flags = Self::flag_iqr(df, column)?;
        let outliers = flags.i64()?.into_iter().flatten().filter(|&f| f == 1).count();
        df.with_column(flags)?;
        Ok(outliers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_with_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        let bounds = IqrBounds::from_values(&values).unwrap().unwrap();

        assert_eq!(bounds.q1, 3.25);
        assert_eq!(bounds.q3, 7.75);
        assert_eq!(bounds.iqr, 4.5);
        assert_eq!(bounds.lower, -3.5);
        assert_eq!(bounds.upper, 14.5);
        assert!(bounds.is_outlier(100.0));
        assert!(!bounds.is_outlier(9.0));
    }

    #[test]
    fn test_bounds_unsorted_input() {
        let bounds = IqrBounds::from_values(&[5.0, 1.0, 3.0]).unwrap().unwrap();
        assert_eq!(bounds.q1, 2.0);
        assert_eq!(bounds.q3, 4.0);
    }

    #[test]
    fn test_bounds_single_value() {
        let bounds = IqrBounds::from_values(&[7.0]).unwrap().unwrap();
        assert_eq!(bounds.iqr, 0.0);
        assert!(!bounds.is_outlier(7.0));
        assert!(IqrBounds::from_values(&[]).unwrap().is_none());
        assert!(IqrBounds::from_values(&[f64::NAN]).unwrap().is_none());
    }

    #[test]
    fn test_flag_iqr() {
        let df = df![
            "RoomService" => [
                Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0),
                Some(6.0), Some(7.0), Some(8.0), Some(9.0), Some(100.0), None,
            ],
        ]
        .unwrap();

        let flags = OutlierDetector::flag_iqr(&df, "RoomService").unwrap();

        assert_eq!(flags.name().as_str(), "RoomService_outlier");
        let flags: Vec<Option<i64>> = flags.i64().unwrap().into_iter().collect();
        let mut expected = vec![Some(0); 11];
        expected[9] = Some(1);
        assert_eq!(flags, expected);
    }

    #[test]
    fn test_nan_is_neither_sample_nor_outlier() {
        let df = df![
            "Spa" => [1.0, 2.0, 3.0, 4.0, 5.0, f64::NAN],
        ]
        .unwrap();

        let bounds = OutlierDetector::bounds(&df, "Spa").unwrap();
        assert_eq!(bounds.q1, 2.0);
        assert_eq!(bounds.q3, 4.0);

        let flags = OutlierDetector::flag_iqr(&df, "Spa").unwrap();
        let flags: Vec<Option<i64>> = flags.i64().unwrap().into_iter().collect();
        assert_eq!(flags, vec![Some(0); 6]);
    }

    #[test]
    fn test_add_outlier_flag() {
        let mut df = df!["Spa" => [1.0, 1.0, 1.0, 1.0, 50.0]].unwrap();

        let outliers = OutlierDetector::add_outlier_flag(&mut df, "Spa").unwrap();

        assert_eq!(outliers, 1);
        assert!(df.column("Spa_outlier").is_ok());
    }

    #[test]
    fn test_flag_iqr_errors() {
        let df = df![
            "Age" => [None::<f64>, None],
            "HomePlanet" => ["Earth", "Mars"],
        ]
        .unwrap();

        assert!(matches!(
            OutlierDetector::flag_iqr(&df, "Age"),
            Err(PreprocessingError::NoValidValues(_))
        ));
        assert!(matches!(
            OutlierDetector::flag_iqr(&df, "Missing"),
            Err(PreprocessingError::ColumnNotFound(_))
        ));
        assert!(matches!(
            OutlierDetector::flag_iqr(&df, "HomePlanet"),
            Err(PreprocessingError::TypeConversionFailed { .. })
        ));
    }
}
