//! The passenger preprocessor.
//!
//! Runs every stage in a fixed order, then derives the aggregate spending
//! features. See [`Preprocessor::builder()`].

use crate::columns::{self, SERVICE_COUNT, USED_ANY_SERVICE};
use crate::config::{ConfigValidationError, PreprocessorConfig};
use crate::error::Result;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::pipeline::Transformer;
use crate::stages::{
    BinaryNormalizer, CabinDecomposer, CategoricalFiller, GroupFeatureExtractor, NumericImputer,
    SpendingEncoder, Stage,
};
use crate::types::{StageReport, TransformSummary};
use crate::utils::numeric_values;
use polars::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Feature-engineering preprocessor for passenger tables.
///
/// Holds only its configuration and an optional progress reporter. Every
/// statistic is recomputed on the table passed to `transform`, so one
/// preprocessor can transform a training table and a test table
/// independently.
///
/// # Example
///
/// ```rust,ignore
/// use spaceship_prep::{Preprocessor, Transformer};
///
/// let mut preprocessor = Preprocessor::builder()
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?;
///
/// let train = preprocessor.fit_transform(train)?;
/// let (test, summary) = preprocessor.transform_with_summary(test)?;
/// println!("Added columns: {:?}", summary.columns_added);
/// ```
#[derive(Default)]
pub struct Preprocessor {
    config: PreprocessorConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(Preprocessor: Send, Sync);

impl Preprocessor {
    /// Create a new preprocessor builder.
    pub fn builder() -> PreprocessorBuilder {
        PreprocessorBuilder::default()
    }

    pub fn config(&self) -> &PreprocessorConfig {
        &self.config
    }

    /// Transform a table and report what each stage did.
    ///
    /// # Errors
    ///
    /// Fails with [`PreprocessingError::ColumnNotFound`] when a required
    /// column is absent. Missing values inside present columns never fail.
    ///
    /// [`PreprocessingError::ColumnNotFound`]: crate::PreprocessingError::ColumnNotFound
    pub fn transform_with_summary(&self, df: DataFrame) -> Result<(DataFrame, TransformSummary)> {
        match self.transform_internal(df) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Preprocessing complete"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Preprocessing error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    /// The column stages, in execution order.
    fn stages(&self) -> Vec<Box<dyn Stage>> {
        let config = &self.config;
        vec![
            Box::new(SpendingEncoder::new(config.spending_columns.iter().cloned())),
            Box::new(BinaryNormalizer::new(config.binary_columns.iter().cloned())),
            Box::new(NumericImputer::default()),
            Box::new(CabinDecomposer::new(
                config.cabin_sentinel.clone(),
                config.malformed_cabin,
            )),
            Box::new(CategoricalFiller::new(
                config.categorical_columns.iter().cloned(),
                config.categorical_sentinel.clone(),
            )),
            Box::new(GroupFeatureExtractor),
        ]
    }

    fn transform_internal(&self, mut df: DataFrame) -> Result<(DataFrame, TransformSummary)> {
        let start_time = Instant::now();
        info!(
            "Starting preprocessing of {} rows x {} columns",
            df.height(),
            df.width()
        );

        let columns_before = column_names(&df);
        let mut summary = TransformSummary::new();
        summary.rows = df.height();
        summary.columns_before = columns_before.len();

        for stage in self.stages() {
            let report = self.run_stage(stage.stage(), &mut df, |df, report| {
                stage.apply(df, report)
            })?;
            summary.stages.push(report);
        }

        let report = self.run_stage(PipelineStage::AggregateFeatures, &mut df, |df, report| {
            add_aggregate_features(df, &self.config.spending_columns, report)
        })?;
        summary.stages.push(report);

        let columns_after = column_names(&df);
        summary.columns_after = columns_after.len();
        summary.columns_added = difference(&columns_after, &columns_before);
        summary.columns_removed = difference(&columns_before, &columns_after);
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Preprocessing complete in {}ms: {} columns added, {} removed",
            summary.duration_ms,
            summary.columns_added.len(),
            summary.columns_removed.len()
        );

        Ok((df, summary))
    }

    fn run_stage<F>(
        &self,
        stage: PipelineStage,
        df: &mut DataFrame,
        apply: F,
    ) -> Result<StageReport>
    where
        F: FnOnce(&mut DataFrame, &mut StageReport) -> Result<()>,
    {
        self.report_progress(ProgressUpdate::new(
            stage,
            0.0,
            format!("{}...", stage.display_name()),
        ));

        let mut report = StageReport::new(stage);
        apply(df, &mut report)?;

        if report.is_skipped() {
            info!("{} skipped", stage.display_name());
        } else {
            debug!("{} done ({} steps)", stage.display_name(), report.steps.len());
        }
        self.report_progress(ProgressUpdate::new(
            stage,
            1.0,
            format!("{} complete", stage.display_name()),
        ));

        Ok(report)
    }
}

impl Transformer for Preprocessor {
    /// No-op: every statistic is computed from the table being transformed.
    fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        debug!("fit called on {} rows; nothing to learn", df.height());
        Ok(self)
    }

    fn transform(&self, df: DataFrame) -> Result<DataFrame> {
        self.transform_with_summary(df).map(|(df, _)| df)
    }
}

/// Add `ServiceCount` (row sum of spending, nulls as 0) and `UsedAnyService`.
fn add_aggregate_features(
    df: &mut DataFrame,
    spending_columns: &[String],
    report: &mut StageReport,
) -> Result<()> {
    let mut totals = vec![0.0f64; df.height()];
    for column in spending_columns {
        let values = numeric_values(columns::require(df, column)?)?;
        for (total, value) in totals.iter_mut().zip(values) {
            *total += value.unwrap_or(0.0);
        }
    }

    let used: Vec<i64> = totals.iter().map(|&total| (total > 0.0) as i64).collect();
    let users: i64 = used.iter().sum();

    df.with_column(Series::new(SERVICE_COUNT.into(), totals))?;
    df.with_column(Series::new(USED_ANY_SERVICE.into(), used))?;

    report.step(format!(
        "Summed {} spending columns into '{}'",
        spending_columns.len(),
        SERVICE_COUNT
    ));
    report.step(format!(
        "Flagged {} passengers in '{}'",
        users, USED_ANY_SERVICE
    ));

    Ok(())
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Names in `left` that are not in `right`, in `left` order.
fn difference(left: &[String], right: &[String]) -> Vec<String> {
    let right: HashSet<&String> = right.iter().collect();
    left.iter()
        .filter(|name| !right.contains(name))
        .cloned()
        .collect()
}

/// Builder for [`Preprocessor`].
#[derive(Default)]
pub struct PreprocessorBuilder {
    config: Option<PreprocessorConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PreprocessorBuilder: Send);

impl PreprocessorBuilder {
    /// Set the preprocessor configuration.
    pub fn config(mut self, config: PreprocessorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates at stage boundaries.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the preprocessor.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Preprocessor, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Preprocessor {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
