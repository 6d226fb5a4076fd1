//! Gateways for fetching user-search pages from the provider.
//!
//! The trait-based design enables mocking in tests while the
//! `reqwest`-backed implementation handles real HTTP requests, retry
//! scheduling, and rate-limit policy.

mod client;
mod error_mapping;
mod fixture;
mod http;

pub use fixture::FixtureSearchGateway;
pub use http::{DEFAULT_API_BASE, HttpSearchGateway};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::github::error::SearchError;
use crate::github::filters::SearchFilters;
use crate::github::models::SearchPage;

/// Gateway that can fetch one page of user-search results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Fetches the page the filters point at.
    ///
    /// The cancellation token aborts both backoff sleeps and the
    /// network call itself; a cancelled fetch resolves to
    /// [`SearchError::Cancelled`] without side effects.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidRequest`] for out-of-range
    /// pagination, [`SearchError::RateLimited`] when the quota policy
    /// fails fast or retries exhaust against rate limiting, and
    /// [`SearchError::ServerError`] for upstream or transport failures.
    async fn fetch_page(
        &self,
        filters: &SearchFilters,
        cancel: CancellationToken,
    ) -> Result<SearchPage, SearchError>;
}
