//! Rate-limit metadata and the retry policy built on top of it.
//!
//! GitHub includes quota headers (`x-ratelimit-limit`,
//! `x-ratelimit-remaining`, `x-ratelimit-reset`) in API responses.
//! [`RateLimitInfo`] captures those values, keeping "unknown" distinct
//! from "zero remaining", and the policy types decide whether a
//! rate-limited response should fail fast, wait, or back off.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use http::HeaderMap;
use http::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};

const HEADER_LIMIT: &str = "x-ratelimit-limit";
const HEADER_REMAINING: &str = "x-ratelimit-remaining";
const HEADER_RESET: &str = "x-ratelimit-reset";
const HEADER_RESOURCE: &str = "x-ratelimit-resource";

/// Quota snapshot extracted from one provider response.
///
/// Every field is optional: a missing header yields `None`, never zero.
/// Snapshots are re-derived from each response and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
    /// Maximum requests allowed in the current window.
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
    /// Remaining requests in the current window.
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining: Option<u32>,
    /// Unix timestamp (seconds) when the window resets.
    #[serde(skip_serializing_if = "Option::is_none")]
    reset: Option<u64>,
    /// ISO-8601 rendering of `reset`, derived at construction.
    #[serde(skip_serializing_if = "Option::is_none")]
    reset_at: Option<String>,
    /// Provider-side resource label (e.g. `search`).
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<String>,
}

impl RateLimitInfo {
    /// Creates a snapshot from raw quota values, deriving `reset_at`.
    #[must_use]
    pub fn new(limit: Option<u32>, remaining: Option<u32>, reset: Option<u64>) -> Self {
        Self {
            limit,
            remaining,
            reset,
            reset_at: reset.and_then(format_reset),
            resource: None,
        }
    }

    /// Attaches the provider resource label.
    #[must_use]
    pub fn with_resource(mut self, resource: Option<String>) -> Self {
        self.resource = resource;
        self
    }

    /// Parses quota headers from a provider response.
    ///
    /// Unparseable or absent headers yield `None` for the corresponding
    /// field so callers can distinguish unknown quota from exhaustion.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::new(
            header_number(headers, HEADER_LIMIT),
            header_number(headers, HEADER_REMAINING),
            header_number(headers, HEADER_RESET),
        )
        .with_resource(header_text(headers, HEADER_RESOURCE))
    }

    /// Returns the window limit, if known.
    #[must_use]
    pub const fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Returns the remaining request count, if known.
    #[must_use]
    pub const fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    /// Returns the reset timestamp in Unix seconds, if known.
    #[must_use]
    pub const fn reset(&self) -> Option<u64> {
        self.reset
    }

    /// Returns the reset instant as an ISO-8601 string, if known.
    #[must_use]
    pub fn reset_at(&self) -> Option<&str> {
        self.reset_at.as_deref()
    }

    /// Returns the provider resource label, if present.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Returns true when the quota is known to be exhausted.
    ///
    /// Unknown quota is not exhaustion.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Calculates seconds until the window resets.
    ///
    /// Returns `None` when the reset time is unknown, and zero when it
    /// has already passed.
    #[must_use]
    pub fn seconds_until_reset(&self) -> Option<u64> {
        self.reset.map(|reset| reset.saturating_sub(unix_now_secs()))
    }
}

/// Decides whether a rate-limited response should fail fast.
///
/// Retrying against a hard quota wall only produces a retry storm; but
/// when the reset is close, backing off and waiting it out serves the
/// caller better than failing outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortCircuitPolicy {
    window: Duration,
}

/// Seconds-to-reset beyond which a rate-limited request fails fast.
pub const DEFAULT_SHORT_CIRCUIT_WINDOW: Duration = Duration::from_secs(30);

impl Default for ShortCircuitPolicy {
    fn default() -> Self {
        Self {
            window: DEFAULT_SHORT_CIRCUIT_WINDOW,
        }
    }
}

impl ShortCircuitPolicy {
    /// Creates a policy with the given wait-it-out window.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Returns true only when the quota is known to be exhausted, the
    /// reset time is known, and more than the configured window remains
    /// until reset. Unknown quota never short-circuits.
    #[must_use]
    pub fn should_short_circuit(&self, info: &RateLimitInfo) -> bool {
        if !info.is_exhausted() {
            return false;
        }
        info.seconds_until_reset()
            .is_some_and(|seconds| seconds > self.window.as_secs())
    }
}

/// Exponential backoff schedule with uniform jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base: Duration,
    jitter: Duration,
}

/// Base delay for the first backoff step.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(400);
/// Upper bound of the uniform jitter added to each step.
pub const DEFAULT_BACKOFF_JITTER: Duration = Duration::from_millis(150);

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: DEFAULT_BACKOFF_BASE,
            jitter: DEFAULT_BACKOFF_JITTER,
        }
    }
}

impl BackoffPolicy {
    /// Creates a schedule from a base delay and jitter bound.
    #[must_use]
    pub const fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    /// Computes `base * 2^attempt` plus uniform jitter for a zero-based
    /// attempt counter.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt);
        let delay = self.base.saturating_mul(factor);
        delay.saturating_add(self.random_jitter())
    }

    fn random_jitter(&self) -> Duration {
        let bound = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        if bound == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(fastrand::u64(0..bound))
    }
}

/// Retry behaviour for one logical page request.
///
/// The attempt budget, backoff constants, and short-circuit window are
/// policy choices, not invariants; configuration supplies overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts shared across the lifetime of one page request.
    pub max_attempts: u32,
    /// Delay schedule for retries without a provider hint.
    pub backoff: BackoffPolicy,
    /// Fail-fast decision for rate-limited responses.
    pub short_circuit: ShortCircuitPolicy,
}

/// Attempt budget applied when configuration does not override it.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: BackoffPolicy::default(),
            short_circuit: ShortCircuitPolicy::default(),
        }
    }
}

/// Parses a `retry-after` header value into a wait duration.
///
/// Accepts the integer-seconds form or an HTTP date; a date already in
/// the past yields `None`.
#[must_use]
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let trimmed = value.trim();
    if let Ok(seconds) = trimmed.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let target = DateTime::parse_from_rfc2822(trimmed).ok()?;
    let delta_ms = target.timestamp_millis() - Utc::now().timestamp_millis();
    u64::try_from(delta_ms).ok().map(Duration::from_millis)
}

/// Extracts and parses the `retry-after` hint from response headers.
#[must_use]
pub fn retry_after_hint(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_retry_after)
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    header_text(headers, name).and_then(|text| text.parse().ok())
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned)
}

fn format_reset(reset: u64) -> Option<String> {
    let seconds = i64::try_from(reset).ok()?;
    DateTime::<Utc>::from_timestamp(seconds, 0).map(|instant| instant.to_rfc3339())
}

fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
