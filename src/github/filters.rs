//! Structured search filters and their URL-query round-trip.
//!
//! Filters arrive as URL-style query pairs (`term`, `in`, `type`,
//! `location`, `language`, `repos`, `followers`, `created`,
//! `sponsorable`, `page`, `perPage`, `sort`, `order`) and are parsed
//! into a typed shape here; the query builder serializes the same shape
//! into the provider's search language. Parsing is total: malformed
//! values fall back to defaults or are dropped rather than failing.

use std::collections::HashMap;

use url::form_urlencoded;

use super::error::SearchError;

/// Maximum page size accepted by the provider.
pub const MAX_PER_PAGE: u8 = 100;

/// Page size applied when filters omit one.
pub const DEFAULT_PER_PAGE: u8 = 20;

/// Field scopes the search term is matched against (`in:` qualifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Match against the login handle.
    Login,
    /// Match against the display name.
    Name,
    /// Match against the public email.
    Email,
}

impl SearchScope {
    /// Returns the qualifier token for this scope.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Name => "name",
            Self::Email => "email",
        }
    }

    /// Parses a scope tag, returning `None` for unrecognized input.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "login" => Some(Self::Login),
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            _ => None,
        }
    }
}

/// Account kinds the search can be restricted to (`type:` qualifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    /// Individual user accounts.
    User,
    /// Organization accounts.
    Org,
}

impl AccountType {
    /// Returns the qualifier token for this account kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Org => "org",
        }
    }

    /// Parses an account kind, returning `None` for unrecognized input.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "org" => Some(Self::Org),
            _ => None,
        }
    }
}

/// Result orderings offered by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchSort {
    /// The provider's default relevance ranking. Emits no sort
    /// parameter at all.
    #[default]
    Best,
    /// Order by follower count.
    Followers,
    /// Order by repository count.
    Repositories,
    /// Order by account creation date.
    Joined,
}

impl SearchSort {
    /// Returns the canonical tag used in the inbound query surface.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Best => "best",
            Self::Followers => "followers",
            Self::Repositories => "repositories",
            Self::Joined => "joined",
        }
    }

    /// Returns the provider-side sort value, or `None` for best match.
    #[must_use]
    pub const fn api_value(self) -> Option<&'static str> {
        match self {
            Self::Best => None,
            Self::Followers => Some("followers"),
            Self::Repositories => Some("repositories"),
            Self::Joined => Some("joined"),
        }
    }

    /// Parses a sort tag, falling back to best match.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "followers" => Self::Followers,
            "repositories" => Self::Repositories,
            "joined" => Self::Joined,
            _ => Self::Best,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchOrder {
    /// Descending (the provider default).
    #[default]
    Desc,
    /// Ascending.
    Asc,
}

impl SearchOrder {
    /// Returns the provider-side order value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Desc => "desc",
            Self::Asc => "asc",
        }
    }

    /// Parses an order tag, falling back to descending.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }
}

/// Comparison operators for numeric and date qualifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Comparator {
    /// Strictly greater than.
    Gt,
    /// Greater than or equal (the default when omitted).
    #[default]
    Ge,
    /// Strictly less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Exactly equal.
    Eq,
}

impl Comparator {
    /// Returns the operator as it appears in qualifier tokens.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "=",
        }
    }

    /// Splits a leading operator off a raw filter value.
    ///
    /// Returns the default `>=` when no operator prefix is present.
    #[must_use]
    pub fn split_prefix(value: &str) -> (Self, &str) {
        if let Some(rest) = value.strip_prefix(">=") {
            (Self::Ge, rest)
        } else if let Some(rest) = value.strip_prefix("<=") {
            (Self::Le, rest)
        } else if let Some(rest) = value.strip_prefix('>') {
            (Self::Gt, rest)
        } else if let Some(rest) = value.strip_prefix('<') {
            (Self::Lt, rest)
        } else if let Some(rest) = value.strip_prefix('=') {
            (Self::Eq, rest)
        } else {
            (Self::Ge, value)
        }
    }
}

/// A numeric qualifier such as `followers:>=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericFilter {
    /// Comparison operator.
    pub comparator: Comparator,
    /// Threshold value.
    pub value: u64,
}

impl NumericFilter {
    /// Parses an `<operator><value>` form, dropping unparseable input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (comparator, rest) = Comparator::split_prefix(raw);
        rest.trim()
            .parse()
            .ok()
            .map(|value| Self { comparator, value })
    }
}

/// A date qualifier such as `created:>=2020-01-01`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFilter {
    /// Comparison operator.
    pub comparator: Comparator,
    /// Date value, kept as free text the provider understands.
    pub value: String,
}

impl DateFilter {
    /// Parses an `<operator><value>` form, dropping blank input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (comparator, rest) = Comparator::split_prefix(raw);
        let value = rest.trim();
        if value.is_empty() {
            return None;
        }
        Some(Self {
            comparator,
            value: value.to_owned(),
        })
    }
}

/// Structured filter state for one logical search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilters {
    /// Search term; empty means "match all" (serialized as `*`).
    pub term: String,
    /// Scopes the term is matched against; empty emits no qualifier.
    pub search_in: Vec<SearchScope>,
    /// Restrict to one account kind.
    pub account_type: Option<AccountType>,
    /// Location qualifier, emitted only when non-blank.
    pub location: Option<String>,
    /// Language qualifier, emitted only when non-blank.
    pub language: Option<String>,
    /// Repository-count qualifier.
    pub repos: Option<NumericFilter>,
    /// Follower-count qualifier.
    pub followers: Option<NumericFilter>,
    /// Account-creation-date qualifier.
    pub created: Option<DateFilter>,
    /// Restrict to sponsorable accounts.
    pub sponsorable: bool,
    /// Page to fetch (1-based).
    pub page: u32,
    /// Items per page (1..=100).
    pub per_page: u8,
    /// Result ordering.
    pub sort: SearchSort,
    /// Sort direction.
    pub order: SearchOrder,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            term: String::new(),
            search_in: vec![SearchScope::Login, SearchScope::Name],
            account_type: None,
            location: None,
            language: None,
            repos: None,
            followers: None,
            created: None,
            sponsorable: false,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            sort: SearchSort::default(),
            order: SearchOrder::default(),
        }
    }
}

impl SearchFilters {
    /// Returns a copy of these filters positioned at the given page.
    #[must_use]
    pub fn for_page(&self, page: u32) -> Self {
        let mut filters = self.clone();
        filters.page = page;
        filters
    }

    /// Validates the pagination bounds.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidRequest`] when `page` is zero or
    /// `per_page` is zero or exceeds [`MAX_PER_PAGE`].
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.page == 0 {
            return Err(SearchError::InvalidRequest {
                message: "page must be at least 1".to_owned(),
            });
        }
        if self.per_page == 0 {
            return Err(SearchError::InvalidRequest {
                message: "per_page must be at least 1".to_owned(),
            });
        }
        if self.per_page > MAX_PER_PAGE {
            return Err(SearchError::InvalidRequest {
                message: format!("per_page must not exceed {MAX_PER_PAGE}"),
            });
        }
        Ok(())
    }
}

/// Bearer credential wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MissingToken`] when the supplied string is
    /// blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, SearchError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SearchError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Parses filters from a URL-style query string.
///
/// Only the first occurrence of each recognized key is consulted;
/// unrecognized keys are ignored and malformed values fall back to
/// defaults.
#[must_use]
pub fn filters_from_query(query: &str) -> SearchFilters {
    let mut values: HashMap<String, String> = HashMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        values.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    let get = |key: &str| values.get(key).map(String::as_str);

    let defaults = SearchFilters::default();
    let search_in = get("in").map_or(defaults.search_in, |raw| {
        raw.split(',')
            .filter_map(|tag| SearchScope::parse(tag.trim()))
            .collect()
    });

    SearchFilters {
        term: get("term").unwrap_or_default().to_owned(),
        search_in,
        account_type: get("type").and_then(AccountType::parse),
        location: get("location").and_then(non_blank),
        language: get("language").and_then(non_blank),
        repos: get("repos").and_then(NumericFilter::parse),
        followers: get("followers").and_then(NumericFilter::parse),
        created: get("created").and_then(DateFilter::parse),
        sponsorable: get("sponsorable") == Some("true"),
        page: get("page")
            .and_then(|raw| raw.parse().ok())
            .filter(|page| *page > 0)
            .unwrap_or(1),
        per_page: get("perPage")
            .and_then(|raw| raw.parse().ok())
            .filter(|per_page| *per_page > 0)
            .unwrap_or(DEFAULT_PER_PAGE),
        sort: get("sort").map_or_else(SearchSort::default, SearchSort::parse),
        order: get("order").map_or_else(SearchOrder::default, SearchOrder::parse),
    }
}

/// Serializes filters back into the inbound query-string form.
///
/// The output is deterministic for identical filters and round-trips
/// through [`filters_from_query`].
#[must_use]
pub fn filters_to_query(filters: &SearchFilters) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    if !filters.term.is_empty() {
        serializer.append_pair("term", &filters.term);
    }
    if !filters.search_in.is_empty() {
        serializer.append_pair("in", &joined_scopes(&filters.search_in));
    }
    if let Some(kind) = filters.account_type {
        serializer.append_pair("type", kind.as_str());
    }
    if let Some(location) = blank_guard(filters.location.as_deref()) {
        serializer.append_pair("location", location);
    }
    if let Some(language) = blank_guard(filters.language.as_deref()) {
        serializer.append_pair("language", language);
    }
    if let Some(repos) = &filters.repos {
        serializer.append_pair("repos", &format!("{}{}", repos.comparator.as_str(), repos.value));
    }
    if let Some(followers) = &filters.followers {
        serializer.append_pair(
            "followers",
            &format!("{}{}", followers.comparator.as_str(), followers.value),
        );
    }
    if let Some(created) = &filters.created {
        serializer.append_pair(
            "created",
            &format!("{}{}", created.comparator.as_str(), created.value),
        );
    }
    if filters.sponsorable {
        serializer.append_pair("sponsorable", "true");
    }
    serializer.append_pair("page", &filters.page.to_string());
    serializer.append_pair("perPage", &filters.per_page.to_string());
    serializer.append_pair("sort", filters.sort.as_str());
    serializer.append_pair("order", filters.order.as_str());
    serializer.finish()
}

pub(super) fn joined_scopes(scopes: &[SearchScope]) -> String {
    scopes
        .iter()
        .map(|scope| scope.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

fn blank_guard(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{
        AccessToken, AccountType, Comparator, DateFilter, NumericFilter, SearchFilters,
        SearchOrder, SearchScope, SearchSort, filters_from_query, filters_to_query,
    };
    use crate::github::error::SearchError;

    #[test]
    fn parses_full_query_surface() {
        let filters = filters_from_query(
            "term=john&in=login,email&type=org&location=seoul&language=rust\
             &repos=%3E%3D5&followers=%3E10&created=%3E%3D2020-01-01\
             &sponsorable=true&page=2&perPage=15&sort=followers&order=asc",
        );

        assert_eq!(filters.term, "john");
        assert_eq!(filters.search_in, vec![SearchScope::Login, SearchScope::Email]);
        assert_eq!(filters.account_type, Some(AccountType::Org));
        assert_eq!(filters.location.as_deref(), Some("seoul"));
        assert_eq!(filters.language.as_deref(), Some("rust"));
        assert_eq!(
            filters.repos,
            Some(NumericFilter {
                comparator: Comparator::Ge,
                value: 5
            })
        );
        assert_eq!(
            filters.followers,
            Some(NumericFilter {
                comparator: Comparator::Gt,
                value: 10
            })
        );
        assert_eq!(
            filters.created,
            Some(DateFilter {
                comparator: Comparator::Ge,
                value: "2020-01-01".to_owned()
            })
        );
        assert!(filters.sponsorable);
        assert_eq!(filters.page, 2);
        assert_eq!(filters.per_page, 15);
        assert_eq!(filters.sort, SearchSort::Followers);
        assert_eq!(filters.order, SearchOrder::Asc);
    }

    #[test]
    fn empty_query_yields_defaults() {
        let filters = filters_from_query("");
        assert_eq!(filters, SearchFilters::default());
        assert_eq!(filters.page, 1);
        assert_eq!(filters.per_page, 20);
        assert_eq!(filters.sort, SearchSort::Best);
        assert_eq!(filters.order, SearchOrder::Desc);
        assert_eq!(filters.search_in, vec![SearchScope::Login, SearchScope::Name]);
    }

    #[rstest]
    #[case::garbage_number("repos=%3E%3Dabc")]
    #[case::bare_operator("repos=%3E%3D")]
    fn malformed_numeric_filters_are_dropped(#[case] query: &str) {
        assert_eq!(filters_from_query(query).repos, None);
    }

    #[test]
    fn zero_page_falls_back_to_first() {
        let filters = filters_from_query("page=0&perPage=0");
        assert_eq!(filters.page, 1);
        assert_eq!(filters.per_page, 20);
    }

    #[test]
    fn operator_defaults_to_at_least() {
        let filters = filters_from_query("followers=100");
        assert_eq!(
            filters.followers,
            Some(NumericFilter {
                comparator: Comparator::Ge,
                value: 100
            })
        );
    }

    #[test]
    fn round_trips_through_query_string() {
        let filters = filters_from_query(
            "term=jane&type=user&followers=%3C50&sponsorable=true&page=3&perPage=10\
             &sort=joined&order=asc",
        );
        let round_tripped = filters_from_query(&filters_to_query(&filters));
        assert_eq!(round_tripped, filters);
    }

    #[test]
    fn validate_rejects_out_of_range_pagination() {
        let zero_page = SearchFilters {
            page: 0,
            ..SearchFilters::default()
        };
        assert!(matches!(
            zero_page.validate(),
            Err(SearchError::InvalidRequest { .. })
        ));

        let oversized = SearchFilters {
            per_page: 101,
            ..SearchFilters::default()
        };
        assert!(matches!(
            oversized.validate(),
            Err(SearchError::InvalidRequest { .. })
        ));

        assert!(SearchFilters::default().validate().is_ok());
    }

    #[test]
    fn access_token_requires_content() {
        assert!(matches!(
            AccessToken::new("   "),
            Err(SearchError::MissingToken)
        ));
        let token = AccessToken::new("  ghp_example  ").map(|token| token.value().to_owned());
        assert_eq!(token.as_deref(), Ok("ghp_example"));
    }
}
