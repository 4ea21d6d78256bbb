use std::any::Any;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::{FailureKind, FetchError};
use crate::models::OlympicCountry;

/// Shared, read-only country sequence. Cloning only bumps a reference count.
pub type Dataset = Arc<[OlympicCountry]>;

#[derive(Debug, Clone, Serialize)]
pub struct CachedData<T> {
    pub data: T,
    pub loaded_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            loaded_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.loaded_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// Why the last load attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LoadFailure {
    pub kind: FailureKind,
    pub message: String,
    pub failed_at: DateTime<Utc>,
}

impl LoadFailure {
    /// Failure for a source that panicked instead of returning an error.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Self {
            kind: FailureKind::Transport,
            message: format!("Dataset source panicked: {}", detail),
            failed_at: Utc::now(),
        }
    }
}

impl From<&FetchError> for LoadFailure {
    fn from(err: &FetchError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            failed_at: Utc::now(),
        }
    }
}

/// Cache contents as published to subscribers.
///
/// `Failed` is kept apart from `Loaded` with an empty dataset: a valid
/// dataset with zero countries is not a load error.
#[derive(Debug, Clone, Default)]
pub enum CacheState {
    #[default]
    Unloaded,
    Loaded(CachedData<Dataset>),
    Failed(LoadFailure),
}

impl CacheState {
    pub fn loaded(countries: Vec<OlympicCountry>) -> Self {
        CacheState::Loaded(CachedData::new(Dataset::from(countries)))
    }

    /// Loaded countries, or an empty slice when nothing is loaded.
    pub fn countries(&self) -> &[OlympicCountry] {
        match self {
            CacheState::Loaded(cached) => &cached.data[..],
            CacheState::Unloaded | CacheState::Failed(_) => &[],
        }
    }

    pub fn dataset(&self) -> Option<&CachedData<Dataset>> {
        match self {
            CacheState::Loaded(cached) => Some(cached),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&LoadFailure> {
        match self {
            CacheState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_unloaded(&self) -> bool {
        matches!(self, CacheState::Unloaded)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, CacheState::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CacheState::Failed(_))
    }
}

/// Whether `load()` may reuse a cached dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Fetch unless a dataset is already loaded.
    #[default]
    IfNeeded,
    /// Fetch even if a dataset is loaded.
    Force,
}

/// Consumer-facing lifecycle: `Idle -> Loading -> {Ready, LoadFailed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    LoadFailed,
}

impl LoadStatus {
    pub fn from_parts(state: &CacheState, in_flight: bool) -> Self {
        if in_flight {
            return LoadStatus::Loading;
        }
        match state {
            CacheState::Unloaded => LoadStatus::Idle,
            CacheState::Loaded(_) => LoadStatus::Ready,
            CacheState::Failed(_) => LoadStatus::LoadFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_age_display_units() {
        let mut cached = CachedData::new(());
        cached.loaded_at = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");
        cached.loaded_at = Utc::now() - Duration::minutes(125);
        assert_eq!(cached.age_display(), "2h ago");
        cached.loaded_at = Utc::now() - Duration::days(3);
        assert_eq!(cached.age_display(), "3d ago");
    }

    #[test]
    fn test_cached_data_future_timestamp_is_just_now() {
        let mut cached = CachedData::new(());
        cached.loaded_at = Utc::now() + Duration::minutes(10);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_failed_is_distinct_from_empty_dataset() {
        let empty = CacheState::loaded(Vec::new());
        let failed = CacheState::Failed(LoadFailure {
            kind: FailureKind::Transport,
            message: "offline".to_string(),
            failed_at: Utc::now(),
        });

        assert!(empty.is_loaded());
        assert!(failed.is_failed());
        assert!(empty.countries().is_empty());
        assert!(failed.countries().is_empty());
        assert!(empty.dataset().is_some());
        assert!(failed.dataset().is_none());
        assert_eq!(failed.failure().map(|f| f.kind), Some(FailureKind::Transport));
    }

    #[test]
    fn test_failure_from_panic_payload() {
        let from_str = LoadFailure::from_panic(&"boom");
        assert_eq!(from_str.kind, FailureKind::Transport);
        assert!(from_str.message.ends_with("boom"));

        let from_string = LoadFailure::from_panic(&String::from("bang"));
        assert!(from_string.message.ends_with("bang"));

        let opaque = LoadFailure::from_panic(&42_u8);
        assert!(opaque.message.contains("unknown panic"));
    }

    #[test]
    fn test_load_status_from_parts() {
        assert_eq!(LoadStatus::from_parts(&CacheState::Unloaded, false), LoadStatus::Idle);
        assert_eq!(LoadStatus::from_parts(&CacheState::Unloaded, true), LoadStatus::Loading);
        assert_eq!(
            LoadStatus::from_parts(&CacheState::loaded(Vec::new()), false),
            LoadStatus::Ready
        );
    }
}
