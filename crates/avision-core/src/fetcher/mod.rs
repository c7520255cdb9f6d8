//! Snapshot fetching.
//!
//! A [`SnapshotSource`] performs exactly one request per call and never
//! retries; retry policy belongs to the scheduler.

pub mod errors;
pub mod http;

use std::future::Future;

use crate::snapshot::Snapshot;

pub use errors::{FetchError, FetchErrorKind};
pub use http::HttpFetcher;

/// Source of snapshots for the poll scheduler.
///
/// `base_url` is already normalized (non-empty, no trailing slash).
pub trait SnapshotSource: Send + Sync {
    fn poll(&self, base_url: &str) -> impl Future<Output = Result<Snapshot, FetchError>> + Send;
}
