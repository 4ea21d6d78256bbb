//! Medalboard core - Olympic medal statistics from a single static dataset.
//!
//! - `api`: dataset sources (HTTP or file) and transport errors
//! - `repository`: fetch-once session cache with replay-latest subscriptions
//! - `stats`: pure aggregation over a dataset snapshot
//! - `resolver`: country lookup by name with explicit not-found
//! - `views`: home and country-detail figures composed from the above
//! - `config`: where the dataset lives

pub mod api;
pub mod config;
pub mod models;
pub mod repository;
pub mod resolver;
pub mod stats;
pub mod views;

pub use api::{AnySource, DatasetSource, FailureKind, FetchError, FileSource, HttpSource};
pub use config::Config;
pub use models::{OlympicCountry, Participation, Season};
pub use repository::{CacheState, LoadMode, LoadStatus, Repository, Subscription};
pub use resolver::{resolve, Resolution};
pub use views::{CountryPage, CountryView, HomeView};
