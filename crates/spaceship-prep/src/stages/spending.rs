//! Spending indicator encoding.

use super::Stage;
use crate::columns::{self, ColumnPolicy, SPENDING_COLUMNS};
use crate::error::Result;
use crate::pipeline::PipelineStage;
use crate::types::StageReport;
use crate::utils::numeric_values;
use polars::prelude::*;
use tracing::debug;

/// Adds a `{col}_cat` indicator per spending column: 1 if the passenger spent
/// anything on that service, 0 otherwise (missing spend counts as 0).
#[derive(Debug, Clone)]
pub struct SpendingEncoder {
    columns: Vec<String>,
}

impl SpendingEncoder {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Default for SpendingEncoder {
    fn default() -> Self {
        Self::new(SPENDING_COLUMNS)
    }
}

impl Stage for SpendingEncoder {
    fn stage(&self) -> PipelineStage {
        PipelineStage::SpendingEncoding
    }

    fn policy(&self) -> ColumnPolicy {
        ColumnPolicy::Required
    }

    fn apply(&self, df: &mut DataFrame, report: &mut StageReport) -> Result<()> {
        for column in &self.columns {
            let values = numeric_values(columns::require(df, column)?)?;
            let flags: Vec<i64> = values
                .iter()
                .map(|v| matches!(v, Some(spent) if *spent > 0.0) as i64)
                .collect();
            let users: i64 = flags.iter().sum();

            let indicator = columns::spending_indicator_name(column);
            df.with_column(Series::new(indicator.as_str().into(), flags))?;

            debug!("Encoded '{}' into '{}' ({} users)", column, indicator, users);
            report.step(format!(
                "Encoded '{}' as '{}': {} of {} passengers used the service",
                column,
                indicator,
                users,
                values.len()
            ));
        }

        Ok(())
    }
}
