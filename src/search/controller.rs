//! Client-side pagination controller coordinating load-more requests.
//!
//! The controller owns the [`PaginationState`] exclusively and collapses
//! overlapping trigger events (scroll signals racing a form submit) into
//! at most one active request. Responses are applied in the order their
//! requests were accepted as current, not the order they arrive:
//! superseded completions are dropped by the state machine's id check.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::github::error::SearchError;
use crate::github::filters::SearchFilters;
use crate::github::gateway::SearchGateway;
use crate::github::models::SearchPage;

use super::state::{PaginationState, SearchStatus};

/// Result of one [`SearchController::load_next`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and merged.
    Loaded,
    /// The guard rejected the trigger: no further pages, or a request
    /// was already in flight.
    Skipped,
    /// The fetch failed and the state moved to `Failed`.
    Failed,
    /// The request was cancelled; state untouched.
    Cancelled,
    /// The completion arrived after a newer request became
    /// authoritative and was discarded.
    Superseded,
}

/// Owns accumulated results and drives load-more requests through a
/// [`SearchGateway`].
///
/// No ambient singleton is involved: each controller instance is an
/// explicitly owned value, injectable wherever a search surface needs
/// one.
pub struct SearchController {
    gateway: Arc<dyn SearchGateway>,
    state: Mutex<PaginationState>,
    cancel: Mutex<CancellationToken>,
}

impl SearchController {
    /// Creates a controller for the given gateway and initial filters.
    #[must_use]
    pub fn new(gateway: Arc<dyn SearchGateway>, filters: SearchFilters) -> Self {
        Self {
            gateway,
            state: Mutex::new(PaginationState::new(filters)),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Replaces state with an externally fetched first page.
    ///
    /// Any in-flight request is cancelled and becomes stale.
    pub async fn hydrate(&self, response: SearchPage, filters: SearchFilters, query_key: String) {
        self.refresh_cancel().await;
        self.state.lock().await.hydrate(response, filters, query_key);
    }

    /// Clears accumulated results for a new logical query at page 1.
    ///
    /// Any in-flight request is cancelled and becomes stale.
    pub async fn reset(&self, filters: SearchFilters) {
        self.refresh_cancel().await;
        self.state.lock().await.reset(filters);
    }

    /// Cancels the in-flight request, if any, without touching state.
    ///
    /// The cancelled request resolves silently. Pair with [`Self::reset`]
    /// or [`Self::hydrate`] when abandoning the current query, as the
    /// state machine stays in `Loading` until one of them runs.
    pub async fn cancel_in_flight(&self) {
        self.refresh_cancel().await;
    }

    /// Attempts to load the next page and merge it into state.
    ///
    /// A no-op returning [`LoadOutcome::Skipped`] when no further pages
    /// exist or a request is already in flight.
    pub async fn load_next(&self) -> LoadOutcome {
        let Some((id, filters)) = self.state.lock().await.begin_load() else {
            return LoadOutcome::Skipped;
        };
        let cancel = self.cancel.lock().await.clone();

        tracing::debug!(
            "loading page {page} for request {id:?}",
            page = filters.page
        );
        let fetched = self.gateway.fetch_page(&filters, cancel).await;

        let mut state = self.state.lock().await;
        match fetched {
            Ok(page) => {
                if !state.apply_success(id, page) {
                    return LoadOutcome::Superseded;
                }
                if state.status() == SearchStatus::Failed {
                    LoadOutcome::Failed
                } else {
                    LoadOutcome::Loaded
                }
            }
            Err(SearchError::Cancelled) => LoadOutcome::Cancelled,
            Err(error) => {
                tracing::warn!("load-more failed: {error}");
                if state.apply_failure(id, error.notice()) {
                    LoadOutcome::Failed
                } else {
                    LoadOutcome::Superseded
                }
            }
        }
    }

    /// Runs a closure against the current state under the lock.
    pub async fn with_state<R>(&self, read: impl FnOnce(&PaginationState) -> R) -> R {
        read(&*self.state.lock().await)
    }

    /// Returns whether another page exists.
    pub async fn has_more(&self) -> bool {
        self.state.lock().await.has_more()
    }

    async fn refresh_cancel(&self) {
        let mut guard = self.cancel.lock().await;
        guard.cancel();
        *guard = CancellationToken::new();
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests panic on failure")]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::{LoadOutcome, SearchController};
    use crate::github::error::SearchError;
    use crate::github::filters::SearchFilters;
    use crate::github::gateway::MockSearchGateway;
    use crate::github::models::test_support::{search_page, user_summary};
    use crate::github::query::query_key;
    use crate::search::state::SearchStatus;

    fn filters_for(term: &str, per_page: u8) -> SearchFilters {
        SearchFilters {
            term: term.to_owned(),
            per_page,
            ..SearchFilters::default()
        }
    }

    async fn hydrated_controller(gateway: MockSearchGateway) -> SearchController {
        let filters = filters_for("john", 2);
        let controller = SearchController::new(Arc::new(gateway), filters.clone());
        let first = search_page(
            vec![user_summary("a", 1), user_summary("b", 2)],
            1,
            2,
            3,
        );
        let key = query_key(&filters);
        controller.hydrate(first, filters, key).await;
        controller
    }

    #[tokio::test]
    async fn load_next_merges_the_following_page() {
        let mut gateway = MockSearchGateway::new();
        gateway
            .expect_fetch_page()
            .times(1)
            .returning(|filters, _| {
                assert_eq!(filters.page, 2, "must request the next page");
                Ok(search_page(
                    vec![user_summary("b", 2), user_summary("c", 3)],
                    2,
                    2,
                    3,
                ))
            });

        let controller = hydrated_controller(gateway).await;
        assert_eq!(controller.load_next().await, LoadOutcome::Loaded);

        let logins = controller
            .with_state(|state| {
                state
                    .items()
                    .iter()
                    .map(|user| user.login.clone())
                    .collect::<Vec<_>>()
            })
            .await;
        assert_eq!(logins, vec!["a", "b", "c"]);
        assert!(!controller.has_more().await);
    }

    #[tokio::test]
    async fn load_next_skips_when_no_more_pages_exist() {
        let mut gateway = MockSearchGateway::new();
        gateway.expect_fetch_page().times(0);

        let filters = filters_for("john", 2);
        let controller = SearchController::new(Arc::new(gateway), filters.clone());
        let complete = search_page(vec![user_summary("a", 1)], 1, 2, 1);
        let key = query_key(&filters);
        controller.hydrate(complete, filters, key).await;

        assert_eq!(controller.load_next().await, LoadOutcome::Skipped);
    }

    #[tokio::test]
    async fn failure_surfaces_as_failed_with_items_intact() {
        let mut gateway = MockSearchGateway::new();
        gateway.expect_fetch_page().times(1).returning(|_, _| {
            Err(SearchError::ServerError {
                status: Some(502),
                rate_limit: None,
                message: "bad gateway".to_owned(),
            })
        });

        let controller = hydrated_controller(gateway).await;
        assert_eq!(controller.load_next().await, LoadOutcome::Failed);

        controller
            .with_state(|state| {
                assert_eq!(state.status(), SearchStatus::Failed);
                assert_eq!(state.items().len(), 2, "prior pages must survive");
                let notice = state.error().expect("error notice should be recorded");
                assert!(notice.message.contains("bad gateway"));
            })
            .await;
    }

    #[tokio::test]
    async fn cancelled_fetch_resolves_silently() {
        let mut gateway = MockSearchGateway::new();
        gateway
            .expect_fetch_page()
            .times(1)
            .returning(|_, _| Err(SearchError::Cancelled));

        let controller = hydrated_controller(gateway).await;
        assert_eq!(controller.load_next().await, LoadOutcome::Cancelled);

        controller
            .with_state(|state| {
                assert_eq!(state.items().len(), 2, "state must be untouched");
                assert!(state.error().is_none());
            })
            .await;
    }

    /// Gateway whose response deliberately arrives after a delay, so a
    /// reset can overtake it mid-flight.
    struct SlowGateway;

    #[async_trait::async_trait]
    impl crate::github::gateway::SearchGateway for SlowGateway {
        async fn fetch_page(
            &self,
            _filters: &SearchFilters,
            _cancel: tokio_util::sync::CancellationToken,
        ) -> Result<crate::github::models::SearchPage, SearchError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(search_page(vec![user_summary("late", 9)], 2, 2, 3))
        }
    }

    #[tokio::test]
    async fn reset_supersedes_a_slow_in_flight_request() {
        let filters = filters_for("john", 2);
        let controller = SearchController::new(Arc::new(SlowGateway), filters.clone());
        let first = search_page(
            vec![user_summary("a", 1), user_summary("b", 2)],
            1,
            2,
            3,
        );
        let key = query_key(&filters);
        controller.hydrate(first, filters, key).await;

        let shared = Arc::new(controller);
        let racer = Arc::clone(&shared);
        let load = tokio::spawn(async move { racer.load_next().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        shared.reset(filters_for("jane", 2)).await;

        let outcome = load.await.expect("load task should not panic");
        assert_eq!(outcome, LoadOutcome::Superseded);
        shared
            .with_state(|state| {
                assert!(state.items().is_empty(), "late page must not leak in");
                assert_eq!(state.status(), SearchStatus::Idle);
            })
            .await;
    }
}
