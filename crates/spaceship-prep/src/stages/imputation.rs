//! Median imputation for numeric columns.

use super::Stage;
use crate::columns::{self, AGE, ColumnPolicy};
use crate::error::Result;
use crate::pipeline::PipelineStage;
use crate::types::StageReport;
use crate::utils::{fill_numeric_nulls, numeric_values};
use polars::prelude::*;
use tracing::{debug, warn};

/// Fills missing values of one numeric column with the median of its
/// observed values. The result is Float64.
///
/// The median is taken over the table being transformed, never a stored one.
/// If the column has no observed values it is left null and a warning is
/// recorded.
#[derive(Debug, Clone)]
pub struct NumericImputer {
    column: String,
}

impl NumericImputer {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl Default for NumericImputer {
    fn default() -> Self {
        Self::new(AGE)
    }
}

impl Stage for NumericImputer {
    fn stage(&self) -> PipelineStage {
        PipelineStage::NumericImputation
    }

    fn policy(&self) -> ColumnPolicy {
        ColumnPolicy::Required
    }

    fn apply(&self, df: &mut DataFrame, report: &mut StageReport) -> Result<()> {
        let values = numeric_values(columns::require(df, &self.column)?)?;
        let observed = Series::new(self.column.as_str().into(), values);
        let nulls = observed.null_count();

        if nulls == 0 {
            df.with_column(observed)?;
            report.step(format!("'{}' has no missing values", self.column));
            return Ok(());
        }

        match observed.median() {
            Some(median) => {
                let filled = fill_numeric_nulls(&observed, median)?;
                df.with_column(filled)?;

                debug!(
                    "Filled {} nulls in '{}' with median {:.2}",
                    nulls, self.column, median
                );
                report.step(format!(
                    "Filled {} missing values in '{}' with median: {:.2}",
                    nulls, self.column, median
                ));
            }
            None => {
                warn!(
                    "Column '{}' has no observed values, leaving {} nulls",
                    self.column, nulls
                );
                df.with_column(observed)?;
                report.warn(format!(
                    "Could not impute '{}': no observed values to take a median of",
                    self.column
                ));
            }
        }

        Ok(())
    }
}
