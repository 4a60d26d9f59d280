//! Boolean to 0/1 normalization.

use super::Stage;
use crate::columns::{self, BINARY_COLUMNS, ColumnPolicy};
use crate::error::{PreprocessingError, Result};
use crate::pipeline::PipelineStage;
use crate::types::StageReport;
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use tracing::debug;

/// Rewrites nullable boolean columns as Int64 0/1.
///
/// `true` becomes 1; `false`, null and anything else become 0. In a text
/// column only the word `true` (any case) counts as true.
/// Columns that are already 0/1 integers pass through unchanged.
#[derive(Debug, Clone)]
pub struct BinaryNormalizer {
    columns: Vec<String>,
}

impl BinaryNormalizer {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for BinaryNormalizer {
    fn default() -> Self {
        Self::new(BINARY_COLUMNS)
    }
}

fn to_binary(series: &Series) -> Result<Vec<i64>> {
    let flags = match series.dtype() {
        DataType::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| (v == Some(true)) as i64)
            .collect(),
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| v.is_some_and(|s| s.trim().eq_ignore_ascii_case("true")) as i64)
            .collect(),
        DataType::Null => vec![0; series.len()],
        dtype if is_numeric_dtype(dtype) => series
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| (v == Some(1.0)) as i64)
            .collect(),
        dtype => {
            return Err(PreprocessingError::TypeConversionFailed {
                column: series.name().to_string(),
                target_type: "Int64".to_string(),
                reason: format!("unsupported dtype {} for a binary column", dtype),
            });
        }
    };

    Ok(flags)
}

impl Stage for BinaryNormalizer {
    fn stage(&self) -> PipelineStage {
        PipelineStage::BinaryNormalization
    }

    fn policy(&self) -> ColumnPolicy {
        ColumnPolicy::Required
    }

    fn apply(&self, df: &mut DataFrame, report: &mut StageReport) -> Result<()> {
        for column in &self.columns {
            let series = columns::require(df, column)?;
            let nulls = series.null_count();
            let flags = to_binary(series)?;
            let positives: i64 = flags.iter().sum();

            df.with_column(Series::new(column.as_str().into(), flags))?;

            debug!("Normalized '{}' to 0/1 ({} nulls filled with 0)", column, nulls);
            report.step(format!(
                "Mapped '{}' to 0/1: {} true, {} missing filled with 0",
                column, positives, nulls
            ));
        }

        Ok(())
    }
}
