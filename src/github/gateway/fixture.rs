//! Deterministic in-memory gateway mirroring the provider contract.
//!
//! Stands in for the live API during demos and tests: pages are sliced
//! from a fixed user list and carry a synthetic quota snapshot, so the
//! pagination engine above behaves exactly as it would against GitHub.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::github::error::SearchError;
use crate::github::filters::SearchFilters;
use crate::github::mapper::next_page;
use crate::github::models::{SearchPage, UserSummary};
use crate::github::rate_limit::RateLimitInfo;

use super::SearchGateway;

/// Gateway serving canned results from memory.
#[derive(Debug, Clone)]
pub struct FixtureSearchGateway {
    users: Vec<UserSummary>,
}

impl FixtureSearchGateway {
    /// Creates a gateway over an explicit user list.
    #[must_use]
    pub const fn new(users: Vec<UserSummary>) -> Self {
        Self { users }
    }
}

impl Default for FixtureSearchGateway {
    fn default() -> Self {
        let users = [("jane", 1_u64, 42.0), ("john", 2, 33.0), ("mike", 3, 22.0)]
            .into_iter()
            .map(|(login, id, score)| UserSummary {
                login: login.to_owned(),
                id,
                avatar_url: format!("https://avatars.githubusercontent.com/u/{id}"),
                profile_url: format!("https://github.com/{login}"),
                account_type: "User".to_owned(),
                score,
            })
            .collect();
        Self::new(users)
    }
}

#[async_trait]
impl SearchGateway for FixtureSearchGateway {
    async fn fetch_page(
        &self,
        filters: &SearchFilters,
        cancel: CancellationToken,
    ) -> Result<SearchPage, SearchError> {
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        filters.validate()?;

        let start = usize::try_from(u64::from(filters.page - 1) * u64::from(filters.per_page))
            .unwrap_or(usize::MAX);
        let items: Vec<UserSummary> = self
            .users
            .iter()
            .skip(start)
            .take(usize::from(filters.per_page))
            .cloned()
            .collect();
        let total = u64::try_from(self.users.len()).unwrap_or(u64::MAX);

        Ok(SearchPage {
            total_count: total,
            has_more: next_page(filters.page, filters.per_page, total).is_some(),
            items,
            page: filters.page,
            per_page: filters.per_page,
            rate_limit: Some(RateLimitInfo::new(Some(1000), Some(999), None)),
            error: None,
        })
    }
}
