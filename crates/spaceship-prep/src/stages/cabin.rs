//! Cabin decomposition into deck, number and side.

use super::Stage;
use crate::columns::{self, CABIN, ColumnPolicy, DECK, NUMBER, SIDE};
use crate::config::{DEFAULT_CABIN_SENTINEL, MalformedCabinPolicy};
use crate::error::{PreprocessingError, Result, ResultExt};
use crate::pipeline::PipelineStage;
use crate::types::StageReport;
use polars::prelude::*;
use tracing::{debug, warn};

/// Splits `Cabin` ("deck/number/side") into `Deck`, `Number` and `Side`,
/// then drops `Cabin`.
///
/// Missing cabins take the sentinel first. `Number` is Float64, with
/// unparseable numbers read as 0. Tables without a `Cabin` column pass
/// through unchanged.
#[derive(Debug, Clone)]
pub struct CabinDecomposer {
    sentinel: String,
    malformed: MalformedCabinPolicy,
}

impl CabinDecomposer {
    pub fn new(sentinel: impl Into<String>, malformed: MalformedCabinPolicy) -> Self {
        Self {
            sentinel: sentinel.into(),
            malformed,
        }
    }
}

impl Default for CabinDecomposer {
    fn default() -> Self {
        Self::new(DEFAULT_CABIN_SENTINEL, MalformedCabinPolicy::default())
    }
}

/// Split a cabin into exactly three `/`-separated parts.
fn split_cabin(cabin: &str) -> Option<(&str, &str, &str)> {
    let mut parts = cabin.split('/');
    let deck = parts.next()?;
    let number = parts.next()?;
    let side = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((deck, number, side))
}

fn parse_cabin_number(number: &str) -> f64 {
    number
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| !n.is_nan())
        .unwrap_or(0.0)
}

impl Stage for CabinDecomposer {
    fn stage(&self) -> PipelineStage {
        PipelineStage::CabinDecomposition
    }

    fn policy(&self) -> ColumnPolicy {
        ColumnPolicy::SkipIfAbsent
    }

    fn apply(&self, df: &mut DataFrame, report: &mut StageReport) -> Result<()> {
        let Some(cabin) = columns::lookup(df, CABIN, self.policy())? else {
            debug!("No '{}' column, skipping cabin decomposition", CABIN);
            report.skip(format!("column '{}' absent", CABIN));
            return Ok(());
        };

        let fallback = split_cabin(&self.sentinel).ok_or_else(|| {
            PreprocessingError::InvalidConfig(format!(
                "cabin sentinel '{}' must have the form deck/number/side",
                self.sentinel
            ))
        })?;

        let cabins = cabin.cast(&DataType::String)?;
        let cabins = cabins.str()?;

        let mut decks: Vec<&str> = Vec::with_capacity(cabins.len());
        let mut numbers: Vec<f64> = Vec::with_capacity(cabins.len());
        let mut sides: Vec<&str> = Vec::with_capacity(cabins.len());
        let mut filled = 0usize;
        let mut malformed = 0usize;

        for (row, value) in cabins.into_iter().enumerate() {
            let parts = match value {
                None => {
                    filled += 1;
                    fallback
                }
                Some(value) => match split_cabin(value) {
                    Some(parts) => parts,
                    None => match self.malformed {
                        MalformedCabinPolicy::Error => {
                            return Err(PreprocessingError::MalformedValue {
                                column: CABIN.to_string(),
                                row,
                                value: value.to_string(),
                                reason: "expected deck/number/side".to_string(),
                            });
                        }
                        MalformedCabinPolicy::Unknown => {
                            malformed += 1;
                            fallback
                        }
                    },
                },
            };

            let (deck, number, side) = parts;
            decks.push(deck);
            numbers.push(parse_cabin_number(number));
            sides.push(side);
        }

        df.with_column(Series::new(DECK.into(), decks))?;
        df.with_column(Series::new(NUMBER.into(), numbers))?;
        df.with_column(Series::new(SIDE.into(), sides))?;
        df.drop_in_place(CABIN)
            .context("Failed to drop decomposed 'Cabin' column")?;

        if filled > 0 {
            report.step(format!(
                "Filled {} missing cabins with '{}'",
                filled, self.sentinel
            ));
        }
        if malformed > 0 {
            warn!("Treated {} malformed cabins as unknown", malformed);
            report.warn(format!(
                "Treated {} malformed cabins as '{}'",
                malformed, self.sentinel
            ));
        }
        report.step(format!(
            "Split '{}' into '{}', '{}' and '{}'",
            CABIN, DECK, NUMBER, SIDE
        ));

        Ok(())
    }
}
