//! Avatar proxy helpers consumed by presentation layers.
//!
//! The image-proxying endpoint itself is an external collaborator; this
//! module carries only its pure core: building the proxied URL for an
//! avatar and rejecting source hosts outside the fixed allow-list.

use url::{Url, form_urlencoded};

use crate::github::error::SearchError;

/// Hosts the proxy is willing to stream images from.
const ALLOWED_HOSTS: [&str; 1] = ["avatars.githubusercontent.com"];

/// Default mount path of the proxy endpoint.
pub const DEFAULT_PROXY_PATH: &str = "/api/avatar-proxy";

/// Builds the proxied path-and-query form of an avatar URL.
#[must_use]
pub fn avatar_proxy_url(avatar_url: &str, base_path: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("src", avatar_url)
        .finish();
    format!("{base_path}?{query}")
}

/// Validates a proxy source URL against the host allow-list.
///
/// # Errors
///
/// Returns [`SearchError::InvalidRequest`] when the source is not a
/// valid URL or its host is not allow-listed.
pub fn validate_avatar_source(src: &str) -> Result<Url, SearchError> {
    let url: Url = src.parse().map_err(|_| SearchError::InvalidRequest {
        message: "invalid avatar source URL".to_owned(),
    })?;
    let allowed = url
        .host_str()
        .is_some_and(|host| ALLOWED_HOSTS.contains(&host));
    if !allowed {
        return Err(SearchError::InvalidRequest {
            message: "avatar host not allowed".to_owned(),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_PROXY_PATH, avatar_proxy_url, validate_avatar_source};
    use crate::github::error::SearchError;

    #[test]
    fn proxied_url_encodes_the_source() {
        let proxied = avatar_proxy_url(
            "https://avatars.githubusercontent.com/u/1",
            DEFAULT_PROXY_PATH,
        );
        assert!(proxied.starts_with("/api/avatar-proxy?"));
        assert!(proxied.contains("src=https%3A%2F%2Favatars.githubusercontent.com%2Fu%2F1"));
    }

    #[test]
    fn allow_list_rejects_foreign_hosts() {
        assert!(validate_avatar_source("https://avatars.githubusercontent.com/u/1").is_ok());
        assert!(matches!(
            validate_avatar_source("https://example.com/avatar.png"),
            Err(SearchError::InvalidRequest { .. })
        ));
        assert!(matches!(
            validate_avatar_source("not a url"),
            Err(SearchError::InvalidRequest { .. })
        ));
    }
}
