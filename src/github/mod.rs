//! GitHub user-search intake: query building, rate-limit policy,
//! retrying fetch, and response mapping.
//!
//! The modules here translate structured filters into the provider's
//! search language, fetch pages under the quota policy with bounded
//! retries, and normalize the raw payload into stable domain types.
//! Errors are mapped into caller-friendly variants so that nothing of
//! the raw provider shape leaks past this boundary.

pub mod error;
pub mod filters;
pub mod gateway;
pub mod mapper;
pub mod models;
pub mod query;
pub mod rate_limit;

pub use error::{ErrorNotice, SearchError, SearchErrorKind};
pub use filters::{
    AccessToken, AccountType, Comparator, DateFilter, NumericFilter, SearchFilters, SearchOrder,
    SearchScope, SearchSort, filters_from_query, filters_to_query,
};
pub use gateway::{DEFAULT_API_BASE, FixtureSearchGateway, HttpSearchGateway, SearchGateway};
pub use mapper::{dedupe_by_login, next_page};
pub use models::{SearchPage, UserSummary};
pub use query::{build_search_params, build_search_query, query_key};
pub use rate_limit::{
    BackoffPolicy, RateLimitInfo, RetryPolicy, ShortCircuitPolicy, parse_retry_after,
};

#[cfg(test)]
pub use gateway::MockSearchGateway;
