//! HTTP client construction for the search gateway.

use http::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;

use crate::github::error::SearchError;
use crate::github::filters::AccessToken;

const ACCEPT_VALUE: &str = "application/vnd.github+json";
const USER_AGENT_VALUE: &str = "scout-user-search";

/// Builds a `reqwest` client with the provider's required headers.
///
/// The bearer credential is installed as a default header and marked
/// sensitive so it never appears in debug output.
pub(super) fn build_search_client(token: &AccessToken) -> Result<Client, SearchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.value())).map_err(|error| {
        SearchError::Configuration {
            message: format!("invalid token value: {error}"),
        }
    })?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|error| SearchError::Configuration {
            message: format!("failed to build HTTP client: {error}"),
        })
}
