//! Medal statistics derived from a dataset snapshot.
//!
//! Every function here is pure: it reads the country records and builds a
//! new structure. Pass `CacheState::countries()` to aggregate whatever is
//! cached; an unloaded or failed cache is an empty slice and yields zeros.
//!
//! Sums use `u64`, so no total over `u32` counts can overflow in practice.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::OlympicCountry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct GlobalTotals {
    pub total_countries: usize,
    pub total_medals: u64,
    /// Games appearances across all delegations, not distinct years.
    pub total_participation_entries: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct CountryTotals {
    pub total_medals: u64,
    pub total_athletes: u64,
    pub participation_count: usize,
}

/// One chart point: a Games year and the medals won there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// Year rendered as the axis label.
    pub label: String,
    pub year: i32,
    pub medals: u32,
}

/// A country's medals per Games, keyed by its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Series {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct CountryMedals {
    pub country: String,
    pub total_medals: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct MedalShare {
    pub country: String,
    pub total_medals: u64,
    /// Percentage of all medals in the dataset, 0.0 when there are none.
    pub percent: f64,
}

/// Medal, athlete and appearance totals for one country, in a single pass.
pub fn country_totals(country: &OlympicCountry) -> CountryTotals {
    country
        .participations
        .iter()
        .fold(CountryTotals::default(), |acc, p| CountryTotals {
            total_medals: acc.total_medals + u64::from(p.medals_count),
            total_athletes: acc.total_athletes + u64::from(p.athlete_count),
            participation_count: acc.participation_count + 1,
        })
}

pub fn global_totals(countries: &[OlympicCountry]) -> GlobalTotals {
    countries
        .iter()
        .map(country_totals)
        .fold(
            GlobalTotals {
                total_countries: countries.len(),
                ..GlobalTotals::default()
            },
            |acc, totals| GlobalTotals {
                total_medals: acc.total_medals + totals.total_medals,
                total_participation_entries: acc.total_participation_entries
                    + totals.participation_count,
                ..acc
            },
        )
}

/// One point per participation, in participation order.
pub fn time_series(country: &OlympicCountry) -> Series {
    Series {
        name: country.country.clone(),
        points: country
            .participations
            .iter()
            .map(|p| SeriesPoint {
                label: p.year.to_string(),
                year: p.year,
                medals: p.medals_count,
            })
            .collect(),
    }
}

/// Medal total per country, in dataset order.
pub fn per_country_medal_totals(countries: &[OlympicCountry]) -> Vec<CountryMedals> {
    countries
        .iter()
        .map(|c| CountryMedals {
            country: c.country.clone(),
            total_medals: country_totals(c).total_medals,
        })
        .collect()
}

/// Number of distinct Games years present anywhere in the dataset.
pub fn distinct_games(countries: &[OlympicCountry]) -> usize {
    countries
        .iter()
        .flat_map(|c| c.participations.iter().map(|p| p.year))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Per-country totals with each country's share of all medals.
pub fn medal_share(countries: &[OlympicCountry]) -> Vec<MedalShare> {
    let per_country = per_country_medal_totals(countries);
    let total: u64 = per_country.iter().map(|c| c.total_medals).sum();

    per_country
        .into_iter()
        .map(|c| MedalShare {
            percent: if total == 0 {
                0.0
            } else {
                c.total_medals as f64 * 100.0 / total as f64
            },
            country: c.country,
            total_medals: c.total_medals,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{OlympicCountry, Participation, Season};

    pub fn participation(year: i32, medals: u32, athletes: u32) -> Participation {
        Participation {
            year,
            city: format!("City {}", year),
            season: Season::Summer,
            medals_count: medals,
            athlete_count: athletes,
        }
    }

    pub fn country(id: i64, name: &str, participations: Vec<Participation>) -> OlympicCountry {
        OlympicCountry {
            id,
            country: name.to_string(),
            participations,
        }
    }

    /// France (2000: 5/20, 2004: 3/18) and Italy (2000: 2/15).
    pub fn france_and_italy() -> Vec<OlympicCountry> {
        vec![
            country(
                1,
                "France",
                vec![participation(2000, 5, 20), participation(2004, 3, 18)],
            ),
            country(2, "Italy", vec![participation(2000, 2, 15)]),
        ]
    }
}
