//! Sentinel fill for categorical columns.

use super::Stage;
use crate::columns::{self, CATEGORICAL_COLUMNS, ColumnPolicy};
use crate::config::DEFAULT_CATEGORICAL_SENTINEL;
use crate::error::Result;
use crate::pipeline::PipelineStage;
use crate::types::StageReport;
use crate::utils::fill_string_nulls;
use polars::prelude::*;
use tracing::debug;

/// Replaces missing values in categorical columns with a fixed label.
#[derive(Debug, Clone)]
pub struct CategoricalFiller {
    columns: Vec<String>,
    sentinel: String,
}

impl CategoricalFiller {
    pub fn new<I, S>(columns: I, sentinel: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            sentinel: sentinel.into(),
        }
    }
}

impl Default for CategoricalFiller {
    fn default() -> Self {
        Self::new(CATEGORICAL_COLUMNS, DEFAULT_CATEGORICAL_SENTINEL)
    }
}

impl Stage for CategoricalFiller {
    fn stage(&self) -> PipelineStage {
        PipelineStage::CategoricalFilling
    }

    fn policy(&self) -> ColumnPolicy {
        ColumnPolicy::Required
    }

    fn apply(&self, df: &mut DataFrame, report: &mut StageReport) -> Result<()> {
        for column in &self.columns {
            let series = columns::require(df, column)?;
            let nulls = series.null_count();
            if nulls == 0 {
                continue;
            }

            let filled = fill_string_nulls(series, &self.sentinel)?;
            df.with_column(filled)?;

            debug!("Filled {} nulls in '{}'", nulls, column);
            report.step(format!(
                "Filled {} missing values in '{}' with '{}'",
                nulls, column, self.sentinel
            ));
        }

        Ok(())
    }
}
