//! Column transformation stages.
//!
//! Each stage reads some columns of the passenger table and either rewrites
//! them in place or adds new ones. Stages are stateless: every statistic they
//! need (medians, frequency counts) is computed from the table they are given.
//!
//! - [`SpendingEncoder`]: `{col}_cat` usage indicators
//! - [`BinaryNormalizer`]: nullable booleans to 0/1
//! - [`NumericImputer`]: median fill for `Age`
//! - [`CabinDecomposer`]: `Cabin` into `Deck`, `Number`, `Side`
//! - [`CategoricalFiller`]: sentinel fill for categorical columns
//! - [`GroupFeatureExtractor`]: group and family features

mod binary;
mod cabin;
mod categorical;
mod group;
mod imputation;
mod spending;

pub use binary::BinaryNormalizer;
pub use cabin::CabinDecomposer;
pub use categorical::CategoricalFiller;
pub use group::GroupFeatureExtractor;
pub use imputation::NumericImputer;
pub use spending::SpendingEncoder;

use crate::columns::ColumnPolicy;
use crate::error::Result;
use crate::pipeline::PipelineStage;
use crate::types::StageReport;
use polars::prelude::*;

/// A single column transformation step.
pub trait Stage: Send + Sync {
    /// Which pipeline stage this is.
    fn stage(&self) -> PipelineStage;

    /// How the stage treats its defining column being absent.
    fn policy(&self) -> ColumnPolicy;

    /// Transform the table in place, recording steps on the report.
    fn apply(&self, df: &mut DataFrame, report: &mut StageReport) -> Result<()>;

    /// Transform an owned table, discarding the report.
    fn process(&self, mut df: DataFrame) -> Result<DataFrame> {
        let mut report = StageReport::new(self.stage());
        self.apply(&mut df, &mut report)?;
        Ok(df)
    }
}
