//! Country lookup by display name.
//!
//! Matching is exact and case-sensitive: "france" does not resolve to
//! "France". If several records share a name, the first in dataset order
//! wins; duplicates are not otherwise detected.

use tracing::debug;

use crate::models::OlympicCountry;

/// Outcome of a lookup. Not-found is an ordinary value for the caller to
/// branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Found(&'a OlympicCountry),
    NotFound,
}

impl<'a> Resolution<'a> {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    pub fn country(self) -> Option<&'a OlympicCountry> {
        match self {
            Resolution::Found(country) => Some(country),
            Resolution::NotFound => None,
        }
    }
}

/// Look up `name` among `countries`. An unloaded or failed cache passes an
/// empty slice and always resolves to `NotFound`.
pub fn resolve<'a>(countries: &'a [OlympicCountry], name: &str) -> Resolution<'a> {
    match countries.iter().find(|c| c.country == name) {
        Some(country) => {
            debug!(name, id = country.id, "Country resolved");
            Resolution::Found(country)
        }
        None => {
            debug!(name, searched = countries.len(), "Country not found");
            Resolution::NotFound
        }
    }
}
