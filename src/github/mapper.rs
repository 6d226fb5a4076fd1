//! Normalizes raw provider payloads into domain search pages.
//!
//! Projection is a fixed field mapping with no business logic beyond
//! reshaping. Deduplication guards against the provider returning
//! overlapping rows across nearby pages, and `has_more` is derived from
//! the total count rather than trusted from the payload so that server
//! and client pagination decisions cannot diverge.

use std::collections::HashSet;

use super::models::{ApiSearchPayload, SearchPage, UserSummary};
use super::rate_limit::RateLimitInfo;

/// Removes duplicate logins, preserving first-seen order.
///
/// Idempotent: applying it twice yields the same sequence.
#[must_use]
pub fn dedupe_by_login(items: Vec<UserSummary>) -> Vec<UserSummary> {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.login.clone()))
        .collect()
}

/// Returns the next page number, or `None` when the result set ends.
///
/// `max_page = ceil(total / per_page)`; the next page exists iff
/// `page + 1 <= max_page`.
#[must_use]
pub fn next_page(page: u32, per_page: u8, total: u64) -> Option<u32> {
    if per_page == 0 {
        return None;
    }
    let max_page = total.div_ceil(u64::from(per_page));
    let next = u64::from(page).saturating_add(1);
    if next <= max_page {
        u32::try_from(next).ok()
    } else {
        None
    }
}

/// Maps one raw payload into the caller-facing page shape.
pub(super) fn map_search_page(
    payload: ApiSearchPayload,
    page: u32,
    per_page: u8,
    rate_limit: Option<RateLimitInfo>,
) -> SearchPage {
    let items = dedupe_by_login(payload.items.into_iter().map(UserSummary::from).collect());
    SearchPage {
        total_count: payload.total_count,
        has_more: next_page(page, per_page, payload.total_count).is_some(),
        items,
        page,
        per_page,
        rate_limit,
        error: None,
    }
}
