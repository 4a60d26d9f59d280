//! Group and family features derived from `PassengerId` and `Name`.
//!
//! A passenger id has the form `gggg_pp`; the part before the underscore is
//! the travel group. The second whitespace-separated token of the name is the
//! surname. Group and surname frequencies are counted over the whole table
//! before any row is assigned a size.

use super::Stage;
use crate::columns::{
    self, ColumnPolicy, FAMILY_SIZE, GROUP_ID, GROUP_SIZE, IS_SOLO, NAME, PASSENGER_ID,
};
use crate::error::{Result, ResultExt};
use crate::pipeline::PipelineStage;
use crate::types::StageReport;
use crate::utils::frequency_map;
use polars::prelude::*;
use tracing::debug;

/// Adds `GroupID`, `GroupSize`, `FamilySize` and `IsSolo`, then drops `Name`.
///
/// The stage is keyed on `Name`: without it the table passes through
/// unchanged. When `Name` is present, `PassengerId` is required.
///
/// A passenger whose surname cannot be read gets their group size as family
/// size, or 1 when the group is unknown too.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupFeatureExtractor;

fn group_id_of(passenger_id: &str) -> &str {
    passenger_id
        .split_once('_')
        .map_or(passenger_id, |(group, _)| group)
}

fn surname_of(name: &str) -> Option<&str> {
    name.split_whitespace().nth(1)
}

impl Stage for GroupFeatureExtractor {
    fn stage(&self) -> PipelineStage {
        PipelineStage::GroupFeatures
    }

    fn policy(&self) -> ColumnPolicy {
        ColumnPolicy::SkipIfAbsent
    }

    fn apply(&self, df: &mut DataFrame, report: &mut StageReport) -> Result<()> {
        let Some(names) = columns::lookup(df, NAME, self.policy())? else {
            debug!("No '{}' column, skipping group features", NAME);
            report.skip(format!("column '{}' absent", NAME));
            return Ok(());
        };
        let names = names.cast(&DataType::String)?;
        let ids = columns::require(df, PASSENGER_ID)?.cast(&DataType::String)?;

        let group_ids: Vec<Option<&str>> = ids
            .str()?
            .into_iter()
            .map(|id| id.map(group_id_of))
            .collect();
        let group_counts = frequency_map(group_ids.iter().copied());
        let group_sizes: Vec<Option<i64>> = group_ids
            .iter()
            .map(|group| group.and_then(|g| group_counts.get(g).copied()))
            .collect();

        let surnames: Vec<Option<&str>> = names
            .str()?
            .into_iter()
            .map(|name| name.and_then(surname_of))
            .collect();
        let surname_counts = frequency_map(surnames.iter().copied());
        let family_sizes: Vec<i64> = surnames
            .iter()
            .zip(&group_sizes)
            .map(|(surname, group_size)| {
                surname
                    .and_then(|s| surname_counts.get(s).copied())
                    .or(*group_size)
                    .unwrap_or(1)
            })
            .collect();
        let is_solo: Vec<i64> = family_sizes
            .iter()
            .map(|&size| (size == 1) as i64)
            .collect();

        let unknown_surnames = surnames.iter().filter(|s| s.is_none()).count();
        let solo_count: i64 = is_solo.iter().sum();

        df.with_column(Series::new(GROUP_ID.into(), group_ids))?;
        df.with_column(Series::new(GROUP_SIZE.into(), group_sizes))?;
        df.with_column(Series::new(FAMILY_SIZE.into(), family_sizes))?;
        df.with_column(Series::new(IS_SOLO.into(), is_solo))?;
        df.drop_in_place(NAME)
            .context("Failed to drop 'Name' after extracting surnames")?;

        debug!(
            "Found {} groups and {} surnames",
            group_counts.len(),
            surname_counts.len()
        );
        report.step(format!(
            "Derived '{}' and '{}' from {} groups",
            GROUP_ID,
            GROUP_SIZE,
            group_counts.len()
        ));
        report.step(format!(
            "Derived '{}' from {} surnames ({} unreadable names fell back to group size)",
            FAMILY_SIZE,
            surname_counts.len(),
            unknown_surnames
        ));
        report.step(format!("Flagged {} solo travellers in '{}'", solo_count, IS_SOLO));

        Ok(())
    }
}
