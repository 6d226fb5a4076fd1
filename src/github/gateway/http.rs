//! Retrying HTTP gateway for the user-search endpoint.
//!
//! Each logical page request runs a bounded attempt loop:
//! `Attempting(n) -> {Success, Backoff -> Attempting(n + 1),
//! ShortCircuited, Exhausted}`. Quota headers are consulted on every
//! response, and both backoff sleeps and the network call race the
//! caller's cancellation token.

use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use reqwest::{Client, Response};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::github::error::SearchError;
use crate::github::filters::{AccessToken, SearchFilters};
use crate::github::mapper::map_search_page;
use crate::github::models::{ApiSearchPayload, SearchPage};
use crate::github::query::build_search_params;
use crate::github::rate_limit::{RateLimitInfo, RetryPolicy, retry_after_hint};

use super::SearchGateway;
use super::client::build_search_client;
use super::error_mapping::{is_rate_limited, transport_error, upstream_error};

/// Public GitHub API base used when configuration does not override it.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const SEARCH_USERS_PATH: &str = "search/users";

/// `reqwest`-backed implementation of [`SearchGateway`].
pub struct HttpSearchGateway {
    client: Client,
    endpoint: Url,
    policy: RetryPolicy,
}

/// Outcome of one attempt within the bounded loop.
enum Attempt {
    /// Terminal response; no further attempts regardless of status.
    Completed(Response),
    /// Rate limited but within the wait-it-out window; retry after the
    /// provider hint or the backoff schedule.
    RetryAfterLimit {
        response: Response,
        hint: Option<Duration>,
    },
    /// Non-2xx failure worth retrying while budget remains.
    RetryFailure(Response),
    /// Transport failure before any HTTP status was obtained.
    Transport(SearchError),
}

/// Final state of the attempt loop: the last response received, if any,
/// and the last transport failure when no response survived.
struct LoopResult {
    response: Option<Response>,
    transport_failure: Option<SearchError>,
}

impl HttpSearchGateway {
    /// Creates a gateway for the given credential, API base, and retry
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidUrl`] when the base cannot be
    /// parsed and [`SearchError::Configuration`] when the HTTP client
    /// cannot be constructed.
    pub fn new(
        token: &AccessToken,
        api_base: &str,
        policy: RetryPolicy,
    ) -> Result<Self, SearchError> {
        let endpoint = search_endpoint(api_base)?;
        let client = build_search_client(token)?;
        Ok(Self {
            client,
            endpoint,
            policy,
        })
    }

    fn page_url(&self, filters: &SearchFilters) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(
            build_search_params(filters)
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        );
        url
    }

    async fn attempt_once(
        &self,
        url: &Url,
        cancel: &CancellationToken,
    ) -> Result<Attempt, SearchError> {
        let sent = tokio::select! {
            () = cancel.cancelled() => return Err(SearchError::Cancelled),
            sent = self.client.get(url.clone()).send() => sent,
        };
        let response = match sent {
            Ok(response) => response,
            Err(error) => {
                return Ok(Attempt::Transport(transport_error("search users", &error)));
            }
        };

        if is_rate_limited(response.status(), response.headers()) {
            let info = RateLimitInfo::from_headers(response.headers());
            if self.policy.short_circuit.should_short_circuit(&info) {
                tracing::warn!(
                    "quota exhausted with reset {reset:?}; failing fast without retry",
                    reset = info.reset_at()
                );
                return Err(SearchError::RateLimited {
                    rate_limit: Some(info),
                    message: "rate limit exceeded; retry after reset".to_owned(),
                });
            }
            let hint = retry_after_hint(response.headers());
            return Ok(Attempt::RetryAfterLimit { response, hint });
        }

        if response.status().is_success() {
            Ok(Attempt::Completed(response))
        } else {
            Ok(Attempt::RetryFailure(response))
        }
    }

    async fn run_attempts(
        &self,
        url: &Url,
        cancel: &CancellationToken,
    ) -> Result<LoopResult, SearchError> {
        let mut last_response = None;
        let mut last_transport = None;

        for attempt in 0..self.policy.max_attempts {
            let budget_remains = attempt + 1 < self.policy.max_attempts;
            match self.attempt_once(url, cancel).await? {
                Attempt::Completed(response) => {
                    return Ok(LoopResult {
                        response: Some(response),
                        transport_failure: None,
                    });
                }
                Attempt::RetryAfterLimit { response, hint } => {
                    last_response = Some(response);
                    last_transport = None;
                    self.backoff(attempt, hint, cancel).await?;
                }
                Attempt::RetryFailure(response) => {
                    if !budget_remains {
                        return Ok(LoopResult {
                            response: Some(response),
                            transport_failure: None,
                        });
                    }
                    last_response = Some(response);
                    last_transport = None;
                    self.backoff(attempt, None, cancel).await?;
                }
                Attempt::Transport(error) => {
                    tracing::debug!("attempt {attempt} failed in transport: {error}");
                    last_response = None;
                    last_transport = Some(error);
                    if budget_remains {
                        self.backoff(attempt, None, cancel).await?;
                    }
                }
            }
        }

        Ok(LoopResult {
            response: last_response,
            transport_failure: last_transport,
        })
    }

    async fn backoff(
        &self,
        attempt: u32,
        hint: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<(), SearchError> {
        let delay = hint.unwrap_or_else(|| self.policy.backoff.delay_for_attempt(attempt));
        tracing::debug!(
            "backing off {delay_ms}ms before attempt {next}",
            delay_ms = delay.as_millis(),
            next = attempt + 1
        );
        tokio::select! {
            () = cancel.cancelled() => Err(SearchError::Cancelled),
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

#[async_trait]
impl SearchGateway for HttpSearchGateway {
    async fn fetch_page(
        &self,
        filters: &SearchFilters,
        cancel: CancellationToken,
    ) -> Result<SearchPage, SearchError> {
        filters.validate()?;
        let url = self.page_url(filters);

        let outcome = self.run_attempts(&url, &cancel).await?;
        let Some(response) = outcome.response else {
            return Err(outcome.transport_failure.unwrap_or_else(|| {
                SearchError::ServerError {
                    status: None,
                    rate_limit: None,
                    message: "no response from GitHub".to_owned(),
                }
            }));
        };

        let rate_limit = RateLimitInfo::from_headers(response.headers());
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited {
                rate_limit: Some(rate_limit),
                message: "rate limited by GitHub".to_owned(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(upstream_error(status, &body, Some(rate_limit)));
        }

        let payload: ApiSearchPayload =
            response
                .json()
                .await
                .map_err(|error| SearchError::ServerError {
                    status: None,
                    rate_limit: Some(rate_limit.clone()),
                    message: format!("failed to decode search payload: {error}"),
                })?;
        if payload.incomplete_results {
            tracing::debug!(
                "provider flagged incomplete results for page {page}",
                page = filters.page
            );
        }
        Ok(map_search_page(
            payload,
            filters.page,
            filters.per_page,
            Some(rate_limit),
        ))
    }
}

fn search_endpoint(api_base: &str) -> Result<Url, SearchError> {
    let mut base: Url = api_base
        .parse()
        .map_err(|error| SearchError::InvalidUrl(format!("{api_base}: {error}")))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(SEARCH_USERS_PATH)
        .map_err(|error| SearchError::InvalidUrl(error.to_string()))
}
