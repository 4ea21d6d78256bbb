//! Session cache for the Olympic dataset.
//!
//! This module provides the `Repository`, which fetches the dataset at most
//! once per session, keeps the result (or the failure) in memory, and
//! replays the latest state to any number of subscribers.
//!
//! Loading and observing are independent: `observe()` never triggers a
//! fetch, so a consumer that only observes stays in `Unloaded` until some
//! other consumer calls `load()`.

pub mod state;
pub mod store;

pub use state::{CacheState, CachedData, Dataset, LoadFailure, LoadMode, LoadStatus};
pub use store::{Repository, Subscription};
