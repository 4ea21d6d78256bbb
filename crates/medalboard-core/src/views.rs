//! Display-ready figures for the two screens that consume the repository:
//! the home dashboard and the per-country detail page.

use serde::Serialize;

use crate::repository::{CacheState, LoadFailure};
use crate::resolver::{resolve, Resolution};
use crate::stats::{
    country_totals, distinct_games, global_totals, medal_share, time_series, CountryTotals,
    GlobalTotals, MedalShare, Series,
};

/// Home dashboard: headline numbers plus the medal distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    /// Distinct Games editions in the dataset.
    pub games: usize,
    pub totals: GlobalTotals,
    pub medals_by_country: Vec<MedalShare>,
}

impl HomeView {
    /// Zero-valued unless the state is `Loaded`.
    pub fn from_state(state: &CacheState) -> Self {
        let countries = state.countries();
        Self {
            games: distinct_games(countries),
            totals: global_totals(countries),
            medals_by_country: medal_share(countries),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct CountryView {
    pub name: String,
    pub totals: CountryTotals,
    pub series: Series,
}

/// What the detail page should show for a requested country.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum CountryPage {
    Loading,
    LoadFailed(LoadFailure),
    NotFound(String),
    Found(CountryView),
}

impl CountryPage {
    pub fn build(state: &CacheState, name: &str) -> Self {
        match state {
            CacheState::Unloaded => CountryPage::Loading,
            CacheState::Failed(failure) => CountryPage::LoadFailed(failure.clone()),
            CacheState::Loaded(cached) => match resolve(&cached.data, name) {
                Resolution::Found(country) => CountryPage::Found(CountryView {
                    name: country.country.clone(),
                    totals: country_totals(country),
                    series: time_series(country),
                }),
                Resolution::NotFound => CountryPage::NotFound(name.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FailureKind;
    use crate::stats::fixtures::france_and_italy;

    #[test]
    fn test_home_view_from_loaded_state() {
        let state = CacheState::loaded(france_and_italy());
        let view = HomeView::from_state(&state);
        assert_eq!(view.games, 2);
        assert_eq!(view.totals.total_countries, 2);
        assert_eq!(view.totals.total_medals, 10);
        assert_eq!(view.medals_by_country.len(), 2);
        assert_eq!(view.medals_by_country[1].country, "Italy");
    }

    #[test]
    fn test_home_view_from_unloaded_state_is_zero() {
        let view = HomeView::from_state(&CacheState::Unloaded);
        assert_eq!(view.games, 0);
        assert_eq!(view.totals, GlobalTotals::default());
        assert!(view.medals_by_country.is_empty());
    }

    #[test]
    fn test_country_page_found() {
        let state = CacheState::loaded(france_and_italy());
        match CountryPage::build(&state, "France") {
            CountryPage::Found(view) => {
                assert_eq!(view.name, "France");
                assert_eq!(view.totals.total_medals, 8);
                assert_eq!(view.totals.total_athletes, 38);
                assert_eq!(view.series.points.len(), 2);
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_country_page_not_found() {
        let state = CacheState::loaded(france_and_italy());
        assert_eq!(
            CountryPage::build(&state, "Spain"),
            CountryPage::NotFound("Spain".to_string())
        );
    }

    #[test]
    fn test_country_page_follows_load_state() {
        assert_eq!(CountryPage::build(&CacheState::Unloaded, "France"), CountryPage::Loading);

        let failure = LoadFailure {
            kind: FailureKind::Decode,
            message: "bad json".to_string(),
            failed_at: chrono::Utc::now(),
        };
        let page = CountryPage::build(&CacheState::Failed(failure.clone()), "France");
        assert_eq!(page, CountryPage::LoadFailed(failure));
    }

    #[tokio::test]
    async fn test_bundled_dataset_end_to_end() {
        use crate::api::FileSource;
        use crate::repository::Repository;

        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets/mock/olympic.json");
        let repo = Repository::new(FileSource::new(path));
        let state = repo.load().await;

        let home = HomeView::from_state(&state);
        assert_eq!(home.games, 3);
        assert_eq!(home.totals.total_countries, 5);
        assert_eq!(home.totals.total_participation_entries, 15);
        assert_eq!(home.totals.total_medals, 721);

        match CountryPage::build(&repo.snapshot(), "United States") {
            CountryPage::Found(view) => {
                assert_eq!(view.totals.total_medals, 338);
                assert_eq!(view.totals.total_athletes, 1707);
            }
            other => panic!("expected Found, got {:?}", other),
        }
        assert_eq!(repo.fetch_count(), 1);
    }

    #[cfg(feature = "ts")]
    #[test]
    fn test_views_derive_typescript_bindings() {
        use ts_rs::TS;

        assert!(HomeView::decl().contains("medalsByCountry"));
        assert!(CountryView::decl().contains("series"));
        assert!(CountryPage::decl().contains("loadFailed"));
        assert!(LoadFailure::decl().contains("failed_at"));
    }

    #[test]
    fn test_country_page_serializes_with_status_tag() {
        let json = serde_json::to_value(CountryPage::NotFound("Spain".to_string())).unwrap();
        assert_eq!(json["status"], "notFound");
        assert_eq!(json["detail"], "Spain");
    }
}
