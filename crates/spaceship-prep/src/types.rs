use crate::pipeline::PipelineStage;
use serde::{Deserialize, Serialize};

/// Whether a stage changed the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageOutcome {
    Applied,
    /// The stage's defining column was absent.
    Skipped { reason: String },
}

/// What one stage did during a transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: PipelineStage,
    pub outcome: StageOutcome,
    /// Human-readable processing steps, in order.
    pub steps: Vec<String>,
    /// Anomalies recovered locally (e.g. an all-null column that could not be imputed).
    pub warnings: Vec<String>,
}

impl StageReport {
    /// Create an empty report for a stage, marked as applied.
    pub fn new(stage: PipelineStage) -> Self {
        Self {
            stage,
            outcome: StageOutcome::Applied,
            steps: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a processing step.
    pub fn step(&mut self, step: impl Into<String>) {
        self.steps.push(step.into());
    }

    /// Record a warning.
    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Mark the stage as a no-op.
    pub fn skip(&mut self, reason: impl Into<String>) {
        self.outcome = StageOutcome::Skipped {
            reason: reason.into(),
        };
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, StageOutcome::Skipped { .. })
    }
}

/// Summary of a complete transform.
///
/// # Example
///
/// ```rust,ignore
/// let (df, summary) = preprocessor.transform_with_summary(raw)?;
/// println!("Added {:?} in {}ms", summary.columns_added, summary.duration_ms);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Number of rows (unchanged by every stage).
    pub rows: usize,

    /// Number of columns before the transform.
    pub columns_before: usize,
    /// Number of columns after the transform.
    pub columns_after: usize,

    /// Columns present after but not before, in output order.
    pub columns_added: Vec<String>,
    /// Columns present before but not after.
    pub columns_removed: Vec<String>,

    /// Per-stage reports, in execution order.
    pub stages: Vec<StageReport>,
}

impl TransformSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// All processing steps across stages, in order.
    pub fn processing_steps(&self) -> Vec<String> {
        self.stages
            .iter()
            .flat_map(|stage| stage.steps.iter().cloned())
            .collect()
    }

    /// All warnings across stages, in order.
    pub fn warnings(&self) -> Vec<String> {
        self.stages
            .iter()
            .flat_map(|stage| stage.warnings.iter().cloned())
            .collect()
    }

    /// Stages that were skipped because their defining column was absent.
    pub fn skipped_stages(&self) -> Vec<PipelineStage> {
        self.stages
            .iter()
            .filter(|stage| stage.is_skipped())
            .map(|stage| stage.stage)
            .collect()
    }

    /// Report for a given stage, if it ran.
    pub fn stage(&self, stage: PipelineStage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_report_skip() {
        let mut report = StageReport::new(PipelineStage::CabinDecomposition);
        assert!(!report.is_skipped());

        report.skip("column 'Cabin' absent");
        assert!(report.is_skipped());
    }

    #[test]
    fn test_summary_collects_steps_and_warnings() {
        let mut imputation = StageReport::new(PipelineStage::NumericImputation);
        imputation.step("Filled 'Age' with median: 27.00");
        let mut cabin = StageReport::new(PipelineStage::CabinDecomposition);
        cabin.skip("column 'Cabin' absent");
        cabin.warn("nothing to decompose");

        let summary = TransformSummary {
            stages: vec![imputation, cabin],
            ..TransformSummary::new()
        };

        assert_eq!(summary.processing_steps().len(), 1);
        assert_eq!(summary.warnings(), vec!["nothing to decompose".to_string()]);
        assert_eq!(summary.skipped_stages(), vec![PipelineStage::CabinDecomposition]);
        assert!(summary.stage(PipelineStage::NumericImputation).is_some());
        assert!(summary.stage(PipelineStage::GroupFeatures).is_none());
    }

    #[test]
    fn test_stage_outcome_serialization() {
        let outcome = StageOutcome::Skipped {
            reason: "column 'Name' absent".to_string(),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"status\":\"skipped\""));
        assert!(json.contains("Name"));
    }
}
