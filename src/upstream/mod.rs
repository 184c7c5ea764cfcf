//! Upstream random-number sources.
//!
//! The aggregator talks to the upstream service only through [`Fetcher`], so
//! tests can drive it with scripted sources.

pub mod random_org;

pub use random_org::RandomOrgClient;

use crate::models::{FetchRequest, FetchResult};

/// Fetches one sequence of random integers.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform a single bounded-time fetch. Implementations do not retry.
    async fn fetch(&self, request: FetchRequest) -> FetchResult;
}
