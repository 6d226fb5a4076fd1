//! Domain models for user-search results.
//!
//! Types prefixed with `Api` are internal deserialization targets for
//! the provider's snake_case payload; they convert into the public
//! camelCase domain types at the mapping boundary and never leak past
//! it.

use serde::{Deserialize, Serialize};

use super::error::ErrorNotice;
use super::rate_limit::RateLimitInfo;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Normalized summary of one user in a result set.
///
/// `login` is the identity key: result sets are deduplicated by it.
/// Values are immutable once mapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Login handle, unique within a result set.
    pub login: String,
    /// Numeric account id.
    pub id: u64,
    /// Avatar image URL.
    pub avatar_url: String,
    /// Public profile URL.
    pub profile_url: String,
    /// Account kind reported by the provider (e.g. `User`, `Organization`).
    pub account_type: String,
    /// Relevance score assigned by the provider.
    pub score: f64,
}

/// One mapped page of search results, the caller-facing response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Total matches reported by the provider for the whole query.
    pub total_count: u64,
    /// Whether another page exists. Derived, never trusted from the
    /// provider.
    pub has_more: bool,
    /// Ordered, login-unique user summaries.
    pub items: Vec<UserSummary>,
    /// Page this response covers (1-based).
    pub page: u32,
    /// Page size the response was fetched with.
    pub per_page: u8,
    /// Quota snapshot from the response, if headers were present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitInfo>,
    /// Upstream error notice embedded alongside partial results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorNotice>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiSearchPayload {
    pub(super) total_count: u64,
    #[serde(default)]
    pub(super) incomplete_results: bool,
    pub(super) items: Vec<ApiUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiUser {
    pub(super) login: String,
    pub(super) id: u64,
    pub(super) avatar_url: String,
    pub(super) html_url: String,
    #[serde(rename = "type")]
    pub(super) account_type: String,
    #[serde(default)]
    pub(super) score: f64,
}

impl From<ApiUser> for UserSummary {
    fn from(user: ApiUser) -> Self {
        Self {
            login: user.login,
            id: user.id,
            avatar_url: user.avatar_url,
            profile_url: user.html_url,
            account_type: user.account_type,
            score: user.score,
        }
    }
}
