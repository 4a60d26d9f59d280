//! Pipeline module.
//!
//! This module provides the passenger preprocessor, the fit/transform
//! contract it implements and progress reporting.

mod preprocessor;
pub mod progress;
mod transformer;

pub use preprocessor::{Preprocessor, PreprocessorBuilder};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
pub use transformer::Transformer;
