//! Dataset transport module.
//!
//! This module provides the `DatasetSource` trait and its implementations
//! for fetching the raw country array, either over HTTP or from the static
//! resource on disk. Sources only fetch and decode; caching and fan-out
//! belong to the repository.

pub mod client;
pub mod error;

pub use client::{AnySource, DatasetSource, FileSource, HttpSource, DEFAULT_DATA_PATH};
pub use error::{FailureKind, FetchError};
