//! Translates structured filters into the provider's search language.
//!
//! The provider requires a non-empty `q` value, so a blank term becomes
//! the wildcard token. Qualifiers are emitted in a fixed order so that
//! identical filters always produce identical output, which makes the
//! built string usable as a cache key.

use super::filters::{SearchFilters, joined_scopes};

/// Token substituted when the search term is blank.
const WILDCARD_TERM: &str = "*";

/// Builds the `q` value for the user-search endpoint.
///
/// Absent or blank optional filters never contribute a token; numeric
/// and date qualifiers render as `key:<operator><value>`.
#[must_use]
pub fn build_search_query(filters: &SearchFilters) -> String {
    let mut parts: Vec<String> = Vec::new();

    let term = filters.term.trim();
    parts.push(if term.is_empty() {
        WILDCARD_TERM.to_owned()
    } else {
        term.to_owned()
    });

    if !filters.search_in.is_empty() {
        parts.push(format!("in:{}", joined_scopes(&filters.search_in)));
    }
    if let Some(kind) = filters.account_type {
        parts.push(format!("type:{}", kind.as_str()));
    }
    if let Some(location) = trimmed(filters.location.as_deref()) {
        parts.push(format!("location:{location}"));
    }
    if let Some(language) = trimmed(filters.language.as_deref()) {
        parts.push(format!("language:{language}"));
    }
    if let Some(repos) = &filters.repos {
        parts.push(format!("repos:{}{}", repos.comparator.as_str(), repos.value));
    }
    if let Some(followers) = &filters.followers {
        parts.push(format!(
            "followers:{}{}",
            followers.comparator.as_str(),
            followers.value
        ));
    }
    if let Some(created) = &filters.created {
        parts.push(format!(
            "created:{}{}",
            created.comparator.as_str(),
            created.value
        ));
    }
    if filters.sponsorable {
        parts.push("is:sponsorable".to_owned());
    }

    parts.join(" ")
}

/// Builds the ordered request parameters for the user-search endpoint.
///
/// Best-match sort emits no `sort`/`order` pair (the provider's default
/// relevance ranking); any other sort emits both. Page and page size are
/// always present.
#[must_use]
pub fn build_search_params(filters: &SearchFilters) -> Vec<(String, String)> {
    let mut params = vec![("q".to_owned(), build_search_query(filters))];
    if let Some(sort) = filters.sort.api_value() {
        params.push(("sort".to_owned(), sort.to_owned()));
        params.push(("order".to_owned(), filters.order.as_str().to_owned()));
    }
    params.push(("page".to_owned(), filters.page.to_string()));
    params.push(("per_page".to_owned(), filters.per_page.to_string()));
    params
}

/// Canonical identity for a filter set.
///
/// Used by the pagination controller to recognize when the logical
/// query changed and accumulated pages belong to a different search.
#[must_use]
pub fn query_key(filters: &SearchFilters) -> String {
    super::filters::filters_to_query(filters)
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}
