//! Progress reporting for the preprocessing pipeline.
//!
//! The pipeline is synchronous; progress updates are emitted at stage
//! boundaries so a caller (UI, log sink) can follow a long transform.
//!
//! # Example
//!
//! ```rust,ignore
//! use spaceship_prep::{Preprocessor, Transformer};
//!
//! let preprocessor = Preprocessor::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?;
//!
//! let df = preprocessor.transform(df)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the preprocessing pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Deriving `{col}_cat` spending indicators
    SpendingEncoding,
    /// Coercing nullable booleans to 0/1
    BinaryNormalization,
    /// Filling missing ages with the median
    NumericImputation,
    /// Splitting `Cabin` into deck, number and side
    CabinDecomposition,
    /// Filling missing categorical values with a sentinel
    CategoricalFilling,
    /// Deriving group and family features
    GroupFeatures,
    /// Computing `ServiceCount` and `UsedAnyService`
    AggregateFeatures,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SpendingEncoding => "Encoding Spending",
            Self::BinaryNormalization => "Normalizing Binary Columns",
            Self::NumericImputation => "Imputing Numeric Values",
            Self::CabinDecomposition => "Decomposing Cabin",
            Self::CategoricalFilling => "Filling Categorical Values",
            Self::GroupFeatures => "Extracting Group Features",
            Self::AggregateFeatures => "Computing Aggregate Features",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns the typical weight of this stage in the overall pipeline (0.0 - 1.0).
    ///
    /// Weights of the processing stages sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::SpendingEncoding => 0.10,
            Self::BinaryNormalization => 0.10,
            Self::NumericImputation => 0.15,
            Self::CabinDecomposition => 0.15,
            Self::CategoricalFilling => 0.10,
            Self::GroupFeatures => 0.30,
            Self::AggregateFeatures => 0.10,
            Self::Complete => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::SpendingEncoding => 0.0,
            Self::BinaryNormalization => 0.10,
            Self::NumericImputation => 0.20,
            Self::CabinDecomposition => 0.35,
            Self::CategoricalFilling => 0.50,
            Self::GroupFeatures => 0.60,
            Self::AggregateFeatures => 0.90,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// Progress update emitted at stage boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: PipelineStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage.
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Trait for receiving progress updates during preprocessing.
///
/// Implementations must be `Send + Sync` so a preprocessor can be moved to a
/// worker thread while reporting to a UI thread.
///
/// # Example
///
/// ```rust,ignore
/// use spaceship_prep::{ProgressReporter, ProgressUpdate};
///
/// struct StderrReporter;
///
/// impl ProgressReporter for StderrReporter {
///     fn report(&self, update: ProgressUpdate) {
///         eprintln!("{}: {}", update.stage.display_name(), update.message);
///     }
/// }
/// ```
pub trait ProgressReporter: Send + Sync {
    /// Called at each stage boundary. Implementations should not block.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
