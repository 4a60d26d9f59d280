//! Passenger schema column names and the column lookup policy.
//!
//! Every stage reads its input through [`lookup`], passing the
//! [`ColumnPolicy`] it declares. A required column that is absent is a
//! precondition failure; an optional one turns the stage into a no-op.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const PASSENGER_ID: &str = "PassengerId";
pub const NAME: &str = "Name";
pub const CABIN: &str = "Cabin";
pub const AGE: &str = "Age";
pub const CRYO_SLEEP: &str = "CryoSleep";
pub const VIP: &str = "VIP";
pub const HOME_PLANET: &str = "HomePlanet";
pub const DESTINATION: &str = "Destination";

pub const ROOM_SERVICE: &str = "RoomService";
pub const FOOD_COURT: &str = "FoodCourt";
pub const SHOPPING_MALL: &str = "ShoppingMall";
pub const SPA: &str = "Spa";
pub const VR_DECK: &str = "VRDeck";

// Derived columns
pub const DECK: &str = "Deck";
pub const NUMBER: &str = "Number";
pub const SIDE: &str = "Side";
pub const GROUP_ID: &str = "GroupID";
pub const GROUP_SIZE: &str = "GroupSize";
pub const FAMILY_SIZE: &str = "FamilySize";
pub const IS_SOLO: &str = "IsSolo";
pub const SERVICE_COUNT: &str = "ServiceCount";
pub const USED_ANY_SERVICE: &str = "UsedAnyService";

/// Onboard services a passenger can spend on.
pub const SPENDING_COLUMNS: [&str; 5] = [ROOM_SERVICE, FOOD_COURT, SHOPPING_MALL, SPA, VR_DECK];

/// Nullable boolean columns normalized to 0/1.
pub const BINARY_COLUMNS: [&str; 2] = [CRYO_SLEEP, VIP];

/// Categorical columns whose nulls are replaced with a sentinel.
pub const CATEGORICAL_COLUMNS: [&str; 2] = [HOME_PLANET, DESTINATION];

/// Name of the usage indicator derived from a spending column.
pub fn spending_indicator_name(column: &str) -> String {
    format!("{}_cat", column)
}

/// How a stage treats a column that is absent from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPolicy {
    /// Absence is a precondition failure.
    Required,
    /// Absence turns the stage into a no-op.
    SkipIfAbsent,
}

/// Look up a column under the given policy.
///
/// Returns `Ok(None)` only for [`ColumnPolicy::SkipIfAbsent`].
pub fn lookup<'a>(
    df: &'a DataFrame,
    name: &str,
    policy: ColumnPolicy,
) -> Result<Option<&'a Series>> {
    match df.column(name) {
        Ok(column) => Ok(Some(column.as_materialized_series())),
        Err(_) => match policy {
            ColumnPolicy::Required => Err(PreprocessingError::ColumnNotFound(name.to_string())),
            ColumnPolicy::SkipIfAbsent => Ok(None),
        },
    }
}

/// Look up a column that must be present.
pub fn require<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    lookup(df, name, ColumnPolicy::Required)?
        .ok_or_else(|| PreprocessingError::ColumnNotFound(name.to_string()))
}

/// Check whether a column is present.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}
