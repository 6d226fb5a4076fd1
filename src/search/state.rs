//! Pagination state machine owning accumulated search results.
//!
//! The state is a pure structure: every transition is a synchronous
//! method, which keeps the ordering rules testable without any I/O.
//! The async controller drives it and holds the lock. At most one
//! in-flight request id is authoritative at a time; completions tagged
//! with any other id are discarded without touching state.

use crate::github::error::ErrorNotice;
use crate::github::filters::SearchFilters;
use crate::github::mapper::dedupe_by_login;
use crate::github::models::{SearchPage, UserSummary};
use crate::github::query::query_key;
use crate::github::rate_limit::RateLimitInfo;

/// Lifecycle status of the accumulated search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchStatus {
    /// No request in flight; more pages may be loadable.
    #[default]
    Idle,
    /// Exactly one load-more request is in flight.
    Loading,
    /// The last request failed. Retryable: a later load attempt is
    /// permitted once the trigger fires again.
    Failed,
}

/// Identity of one accepted load-more request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(u64);

/// Accumulated results and pagination position for one logical query.
#[derive(Debug, Clone)]
pub struct PaginationState {
    filters: SearchFilters,
    items: Vec<UserSummary>,
    total_count: u64,
    page: u32,
    per_page: u8,
    has_more: bool,
    status: SearchStatus,
    error: Option<ErrorNotice>,
    rate_limit: Option<RateLimitInfo>,
    in_flight: Option<RequestId>,
    query_key: String,
    next_request_id: u64,
}

impl PaginationState {
    /// Creates empty state positioned at the filters' page.
    #[must_use]
    pub fn new(filters: SearchFilters) -> Self {
        let key = query_key(&filters);
        Self {
            page: filters.page,
            per_page: filters.per_page,
            filters,
            items: Vec::new(),
            total_count: 0,
            has_more: false,
            status: SearchStatus::Idle,
            error: None,
            rate_limit: None,
            in_flight: None,
            query_key: key,
            next_request_id: 0,
        }
    }

    /// Replaces all state with an externally fetched snapshot.
    ///
    /// Entry point for first-page data produced before this state
    /// existed. The in-flight id is cleared, so any still-running
    /// request becomes stale, and the supplied query key identifies the
    /// logical query for staleness checks on later filter changes.
    pub fn hydrate(&mut self, response: SearchPage, filters: SearchFilters, query_key: String) {
        self.filters = filters.for_page(response.page);
        self.items = response.items;
        self.total_count = response.total_count;
        self.page = response.page;
        self.per_page = response.per_page;
        self.has_more = response.has_more;
        self.status = if response.error.is_some() {
            SearchStatus::Failed
        } else {
            SearchStatus::Idle
        };
        self.error = response.error;
        self.rate_limit = response.rate_limit;
        self.in_flight = None;
        self.query_key = query_key;
    }

    /// Accepts a load-more trigger, or rejects it as a no-op.
    ///
    /// Returns `None` without any state change when no further pages
    /// exist or a request is already in flight; this is the
    /// backpressure that collapses overlapping scroll triggers. On
    /// acceptance the state enters `Loading` and the returned filters
    /// point at the next page.
    pub fn begin_load(&mut self) -> Option<(RequestId, SearchFilters)> {
        if !self.has_more || self.status == SearchStatus::Loading {
            return None;
        }
        self.next_request_id += 1;
        let id = RequestId(self.next_request_id);
        self.status = SearchStatus::Loading;
        self.in_flight = Some(id);
        Some((id, self.filters.for_page(self.page.saturating_add(1))))
    }

    /// Merges a fulfilled page, unless the request id is stale.
    ///
    /// Returns false when the completion was superseded and discarded.
    /// Deduplication runs over the combined prior + new list, so a
    /// login from an earlier page is never duplicated even if the
    /// provider re-returns it. An embedded upstream error notice moves
    /// the state to `Failed` while still keeping the merged items.
    pub fn apply_success(&mut self, id: RequestId, response: SearchPage) -> bool {
        if self.in_flight != Some(id) {
            return false;
        }
        let mut combined = std::mem::take(&mut self.items);
        combined.extend(response.items);
        self.items = dedupe_by_login(combined);
        self.total_count = response.total_count;
        self.page = response.page;
        self.has_more = response.has_more;
        self.rate_limit = response.rate_limit;
        self.status = if response.error.is_some() {
            SearchStatus::Failed
        } else {
            SearchStatus::Idle
        };
        self.error = response.error;
        self.in_flight = None;
        true
    }

    /// Records a genuine failure, unless the request id is stale.
    ///
    /// Returns false when the completion was superseded and discarded.
    /// Accumulated items stay intact: a failed load-more never discards
    /// previously fetched pages.
    pub fn apply_failure(&mut self, id: RequestId, notice: ErrorNotice) -> bool {
        if self.in_flight != Some(id) {
            return false;
        }
        self.status = SearchStatus::Failed;
        self.error = Some(notice);
        self.in_flight = None;
        true
    }

    /// Clears accumulated results for a new logical query at page 1.
    pub fn reset(&mut self, filters: SearchFilters) {
        let positioned = filters.for_page(1);
        self.query_key = query_key(&positioned);
        self.page = 1;
        self.per_page = positioned.per_page;
        self.filters = positioned;
        self.items = Vec::new();
        self.total_count = 0;
        self.has_more = false;
        self.status = SearchStatus::Idle;
        self.error = None;
        self.rate_limit = None;
        self.in_flight = None;
    }

    /// Returns the filters of the current logical query.
    #[must_use]
    pub const fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    /// Returns the accumulated, login-unique items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[UserSummary] {
        &self.items
    }

    /// Returns the provider-reported total for the whole query.
    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Returns the last merged page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size in effect.
    #[must_use]
    pub const fn per_page(&self) -> u8 {
        self.per_page
    }

    /// Returns whether another page exists.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> SearchStatus {
        self.status
    }

    /// Returns the recorded error notice, if the last request failed.
    #[must_use]
    pub const fn error(&self) -> Option<&ErrorNotice> {
        self.error.as_ref()
    }

    /// Returns the most recent quota snapshot.
    #[must_use]
    pub const fn rate_limit(&self) -> Option<&RateLimitInfo> {
        self.rate_limit.as_ref()
    }

    /// Returns the canonical identity of the current logical query.
    #[must_use]
    pub fn query_key(&self) -> &str {
        &self.query_key
    }

    /// Returns the authoritative in-flight request id, if any.
    #[must_use]
    pub const fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }
}
