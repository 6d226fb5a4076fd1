//! End-to-end pagination scenarios against a mock provider.
//!
//! Exercises the full stack: filters parsed from the inbound query
//! surface, the retrying gateway, and the pagination controller
//! accumulating pages with deduplication.

#![expect(clippy::expect_used, reason = "tests panic on failure")]

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scout::github::query::query_key;
use scout::github::rate_limit::BackoffPolicy;
use scout::github::{SearchError, filters_from_query};
use scout::search::state::SearchStatus;
use scout::{
    AccessToken, HttpSearchGateway, LoadOutcome, RetryPolicy, SearchController, SearchGateway,
};

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        backoff: BackoffPolicy::new(Duration::from_millis(1), Duration::ZERO),
        ..RetryPolicy::default()
    }
}

fn gateway_for(server: &MockServer) -> Arc<HttpSearchGateway> {
    let token = AccessToken::new("valid-token").expect("token should be valid");
    Arc::new(
        HttpSearchGateway::new(&token, &server.uri(), fast_policy())
            .expect("gateway should build"),
    )
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time should be available")
        .as_secs()
}

fn user_json(login: &str, id: u64) -> serde_json::Value {
    serde_json::json!({
        "login": login,
        "id": id,
        "avatar_url": format!("https://avatars.githubusercontent.com/u/{id}"),
        "html_url": format!("https://github.com/{login}"),
        "type": "User",
        "score": 1.0
    })
}

fn page_body(users: Vec<serde_json::Value>, total: u64) -> serde_json::Value {
    serde_json::json!({
        "total_count": total,
        "incomplete_results": false,
        "items": users
    })
}

#[tokio::test]
async fn filters_surface_drives_provider_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/users"))
        .and(query_param("q", "john in:login,name"))
        .and(query_param("sort", "followers"))
        .and(query_param("order", "desc"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(Vec::new(), 0)))
        .expect(1)
        .mount(&server)
        .await;

    let filters =
        filters_from_query("term=john&sort=followers&order=desc&page=2&perPage=10");
    gateway_for(&server)
        .fetch_page(&filters, CancellationToken::new())
        .await
        .expect("request should succeed");
}

#[tokio::test]
async fn overlapping_pages_accumulate_without_duplicates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/users"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![user_json("a", 1), user_json("b", 2)],
            3,
        )))
        .expect(1)
        .mount(&server)
        .await;
    // The provider re-returns login `b` on the next page.
    Mock::given(method("GET"))
        .and(path("/search/users"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![user_json("b", 2), user_json("c", 3)],
            3,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let filters = filters_from_query("term=john&perPage=2");
    let gateway = gateway_for(&server);
    let controller = SearchController::new(gateway.clone(), filters.clone());

    let first = gateway
        .fetch_page(&filters, CancellationToken::new())
        .await
        .expect("first page should resolve");
    assert!(first.has_more, "3 results at 2 per page span 2 pages");
    let key = query_key(&filters);
    controller.hydrate(first, filters, key).await;

    assert_eq!(controller.load_next().await, LoadOutcome::Loaded);

    controller
        .with_state(|state| {
            let logins: Vec<&str> = state
                .items()
                .iter()
                .map(|user| user.login.as_str())
                .collect();
            assert_eq!(logins, vec!["a", "b", "c"]);
            assert!(!state.has_more(), "all 3 users are accumulated");
            assert_eq!(state.page(), 2);
            assert_eq!(state.status(), SearchStatus::Idle);
        })
        .await;

    // A further trigger must collapse without issuing a request.
    assert_eq!(controller.load_next().await, LoadOutcome::Skipped);
}

#[tokio::test]
async fn distant_quota_reset_fails_fast_without_retry() {
    let server = MockServer::start().await;
    let response = ResponseTemplate::new(429)
        .insert_header("x-ratelimit-limit", "30")
        .insert_header("x-ratelimit-remaining", "0")
        .insert_header("x-ratelimit-reset", unix_now() + 60);
    Mock::given(method("GET"))
        .and(path("/search/users"))
        .respond_with(response)
        .expect(1)
        .mount(&server)
        .await;

    let filters = filters_from_query("term=john");
    let error = gateway_for(&server)
        .fetch_page(&filters, CancellationToken::new())
        .await
        .expect_err("request should fail fast");

    match error {
        SearchError::RateLimited { rate_limit, .. } => {
            let quota = rate_limit.expect("quota snapshot should be attached");
            assert_eq!(quota.remaining(), Some(0));
            assert!(quota.reset_at().is_some(), "reset instant should be derived");
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_load_more_keeps_prior_pages_and_stays_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/users"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![user_json("a", 1), user_json("b", 2)],
            4,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/users"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(3)
        .mount(&server)
        .await;

    let filters = filters_from_query("term=john&perPage=2");
    let gateway = gateway_for(&server);
    let controller = SearchController::new(gateway.clone(), filters.clone());

    let first = gateway
        .fetch_page(&filters, CancellationToken::new())
        .await
        .expect("first page should resolve");
    let key = query_key(&filters);
    controller.hydrate(first, filters, key).await;

    assert_eq!(controller.load_next().await, LoadOutcome::Failed);

    controller
        .with_state(|state| {
            assert_eq!(state.status(), SearchStatus::Failed);
            assert_eq!(state.items().len(), 2, "prior page must survive");
            let notice = state.error().expect("error notice should be recorded");
            assert!(notice.message.contains("GitHub error 500"));
            assert!(state.has_more(), "failure leaves pagination retryable");
        })
        .await;
}
