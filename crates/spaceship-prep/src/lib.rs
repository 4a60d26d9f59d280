//! Spaceship Passenger Preprocessing Library
//!
//! Feature engineering for passenger manifests, built with Rust and Polars.
//!
//! # Overview
//!
//! The [`Preprocessor`] turns a raw passenger table into a model-ready one:
//!
//! - **Spending indicators**: `{service}_cat` flags per spending column
//! - **Binary normalization**: `CryoSleep` and `VIP` as 0/1
//! - **Imputation**: median `Age`, sentinel labels for categorical columns
//! - **Cabin decomposition**: `Cabin` split into `Deck`, `Number`, `Side`
//! - **Group features**: `GroupID`, `GroupSize`, `FamilySize`, `IsSolo`
//! - **Aggregates**: `ServiceCount` and `UsedAnyService`
//!
//! Every statistic is computed from the table being transformed, so `fit` is
//! a no-op and a training table and a test table are transformed
//! independently.
//!
//! The [`stats`] module adds confidence intervals for means and proportions
//! and IQR outlier flagging.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use spaceship_prep::{Preprocessor, Transformer};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .with_has_header(true)
//!     .try_into_reader_with_file_path(Some("train.csv".into()))?
//!     .finish()?;
//!
//! let mut preprocessor = Preprocessor::builder().build()?;
//! let features = preprocessor.fit_transform(df)?;
//! ```
//!
//! # Configuration
//!
//! Use [`PreprocessorConfig`] to change column lists, sentinels, or the
//! handling of malformed cabins:
//!
//! ```rust,ignore
//! use spaceship_prep::config::*;
//!
//! let config = PreprocessorConfig::builder()
//!     .categorical_sentinel("Missing")
//!     .malformed_cabin(MalformedCabinPolicy::Unknown)
//!     .build()?;
//!
//! let preprocessor = Preprocessor::builder().config(config).build()?;
//! ```
//!
//! # Errors
//!
//! A required column missing from the input fails the transform with
//! [`PreprocessingError::ColumnNotFound`]. Missing values inside present
//! columns are filled and never fail. `Cabin` and `Name` are optional: the
//! stages keyed on them are skipped when they are absent.

pub mod columns;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod stages;
pub mod stats;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use columns::ColumnPolicy;
pub use config::{
    ConfigValidationError, MalformedCabinPolicy, PreprocessorConfig, PreprocessorConfigBuilder,
};
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use pipeline::{
    ClosureProgressReporter, PipelineStage, Preprocessor, PreprocessorBuilder, ProgressReporter,
    ProgressUpdate, Transformer,
};
pub use stages::{
    BinaryNormalizer, CabinDecomposer, CategoricalFiller, GroupFeatureExtractor, NumericImputer,
    SpendingEncoder, Stage,
};
pub use stats::{ConfidenceInterval, IqrBounds, OutlierDetector, mean_ci, proportion_ci};
pub use types::{StageOutcome, StageReport, TransformSummary};
