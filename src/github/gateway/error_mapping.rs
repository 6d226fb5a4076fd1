//! Error mapping helpers for the HTTP search gateway.

use http::{HeaderMap, StatusCode};
use http::header::RETRY_AFTER;

use crate::github::error::SearchError;
use crate::github::rate_limit::RateLimitInfo;

/// Upstream error bodies are truncated to this many characters before
/// being attached to a surfaced error.
pub(super) const UPSTREAM_MESSAGE_CAP: usize = 300;

/// Checks whether a response signals rate limiting: a 429 status or the
/// presence of a retry hint.
pub(super) fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || headers.contains_key(RETRY_AFTER)
}

/// Maps a non-2xx upstream response into a surfaced error, capping the
/// attached body.
pub(super) fn upstream_error(
    status: StatusCode,
    body: &str,
    rate_limit: Option<RateLimitInfo>,
) -> SearchError {
    SearchError::ServerError {
        status: Some(status.as_u16()),
        rate_limit,
        message: truncate_message(&format!("GitHub error {status}: {body}")),
    }
}

/// Maps a transport-level failure (no HTTP status obtained).
pub(super) fn transport_error(operation: &str, error: &reqwest::Error) -> SearchError {
    SearchError::ServerError {
        status: None,
        rate_limit: None,
        message: format!("{operation} failed: {error}"),
    }
}

fn truncate_message(message: &str) -> String {
    message.chars().take(UPSTREAM_MESSAGE_CAP).collect()
}

#[cfg(test)]
mod tests {
    use http::{HeaderMap, HeaderValue, StatusCode};

    use super::{is_rate_limited, truncate_message, upstream_error};
    use crate::github::error::SearchError;

    #[test]
    fn rate_limit_detection_covers_status_and_hint() {
        let empty = HeaderMap::new();
        assert!(is_rate_limited(StatusCode::TOO_MANY_REQUESTS, &empty));
        assert!(!is_rate_limited(StatusCode::OK, &empty));

        let mut hinted = HeaderMap::new();
        hinted.insert("retry-after", HeaderValue::from_static("5"));
        assert!(is_rate_limited(StatusCode::FORBIDDEN, &hinted));
    }

    #[test]
    fn upstream_bodies_are_truncated() {
        let body = "x".repeat(1000);
        let error = upstream_error(StatusCode::BAD_GATEWAY, &body, None);
        match error {
            SearchError::ServerError {
                status, message, ..
            } => {
                assert_eq!(status, Some(502));
                assert_eq!(message.chars().count(), 300);
            }
            other => panic!("expected ServerError, got {other:?}"),
        }
    }

    #[test]
    fn short_messages_pass_through_untouched() {
        assert_eq!(truncate_message("small"), "small");
    }
}
