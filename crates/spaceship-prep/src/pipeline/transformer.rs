use crate::error::Result;
use polars::prelude::DataFrame;

/// Two-phase fit/transform contract for table preprocessors.
///
/// `fit` learns whatever state the transformer needs from a training table;
/// `transform` applies it to any table. A stateless implementation may make
/// `fit` a no-op and compute every statistic inside `transform`.
pub trait Transformer {
    /// Learn from a training table.
    fn fit(&mut self, df: &DataFrame) -> Result<&mut Self>;

    /// Transform a table.
    fn transform(&self, df: DataFrame) -> Result<DataFrame>;

    /// Fit on a table, then transform that same table.
    fn fit_transform(&mut self, df: DataFrame) -> Result<DataFrame> {
        self.fit(&df)?;
        self.transform(df)
    }
}
