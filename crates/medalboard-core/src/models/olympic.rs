//! Country and participation records as they appear in the static dataset.
//!
//! Records are immutable once decoded. The repository hands them out behind
//! an `Arc`, and every derived figure is computed into a new structure.

use serde::{Deserialize, Serialize};

/// Games season. Descriptive only, never used in aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum Season {
    #[default]
    Summer,
    Winter,
}

/// One country's appearance at one Games edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    /// Identifies the Games edition.
    pub year: i32,
    pub city: String,
    #[serde(default)]
    pub season: Season,
    pub medals_count: u32,
    pub athlete_count: u32,
}

/// One national delegation's full history.
///
/// `country` is the external lookup key and is expected to be unique within
/// a dataset. Duplicate names are not rejected or merged; lookups return the
/// first record in dataset order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct OlympicCountry {
    pub id: i64,
    pub country: String,
    /// Dataset order, usually chronological. Required; an empty array is valid.
    pub participations: Vec<Participation>,
}

impl OlympicCountry {
    /// Games years in participation order.
    pub fn participation_years(&self) -> Vec<i32> {
        self.participations.iter().map(|p| p.year).collect()
    }
}
