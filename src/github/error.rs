//! Error types exposed by the user-search engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rate_limit::RateLimitInfo;

/// Errors surfaced while building requests or communicating with GitHub.
///
/// All fallibility in the crate funnels into this enum; the query builder
/// and response mapper are total functions and never produce one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    /// Required input was missing or malformed. Never retried.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Description of the rejected input.
        message: String,
    },

    /// The provider quota is exhausted, either short-circuited before any
    /// retry or after the attempt budget ran out.
    #[error("rate limited by GitHub: {message}")]
    RateLimited {
        /// Quota snapshot from the rate-limited response, if available.
        rate_limit: Option<RateLimitInfo>,
        /// Human-readable description including any reset hint.
        message: String,
    },

    /// Upstream failure after retries were exhausted, or no response was
    /// obtained at all.
    #[error("GitHub error: {message}")]
    ServerError {
        /// Upstream HTTP status, when a response was received.
        status: Option<u16>,
        /// Last quota snapshot observed before the failure, if any.
        rate_limit: Option<RateLimitInfo>,
        /// Truncated upstream error body or transport detail.
        message: String,
    },

    /// The authentication token was missing.
    #[error("personal access token is required")]
    MissingToken,

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// A URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// The request was aborted by the caller.
    ///
    /// Cancellation is not a failure: the pagination controller discards
    /// it without mutating state or surfacing an error.
    #[error("request cancelled")]
    Cancelled,
}

impl SearchError {
    /// Returns the wire-level category for this error.
    ///
    /// Ambient failures (configuration, token, I/O) fold into
    /// [`SearchErrorKind::ServerError`], matching how unexpected
    /// exceptions surface to callers.
    #[must_use]
    pub const fn kind(&self) -> SearchErrorKind {
        match self {
            Self::InvalidRequest { .. } => SearchErrorKind::InvalidRequest,
            Self::RateLimited { .. } => SearchErrorKind::RateLimited,
            _ => SearchErrorKind::ServerError,
        }
    }

    /// Returns the HTTP status mirroring this error for caller-facing
    /// response contracts.
    ///
    /// `invalid_request` maps to 400, `rate_limited` to 429, and server
    /// errors echo the upstream status when one was observed.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. } => 400,
            Self::RateLimited { .. } => 429,
            Self::ServerError {
                status: Some(status),
                ..
            } => *status,
            _ => 500,
        }
    }

    /// Converts the error into the notice shape embedded in responses.
    #[must_use]
    pub fn notice(&self) -> ErrorNotice {
        ErrorNotice {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Wire-level error categories mirrored in HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchErrorKind {
    /// Missing or malformed required input.
    InvalidRequest,
    /// Provider quota exhausted.
    RateLimited,
    /// Upstream or unexpected failure.
    ServerError,
}

/// Error payload embedded in caller-facing responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotice {
    /// Error category.
    #[serde(rename = "type")]
    pub kind: SearchErrorKind,
    /// Human-readable description.
    pub message: String,
}
