//! Fixture builders for tests exercising search results.

use super::{SearchPage, UserSummary};
use crate::github::mapper::next_page;

/// Builds a user summary with derived URLs for the given login and id.
#[must_use]
pub fn user_summary(login: &str, id: u64) -> UserSummary {
    UserSummary {
        login: login.to_owned(),
        id,
        avatar_url: format!("https://avatars.githubusercontent.com/u/{id}"),
        profile_url: format!("https://github.com/{login}"),
        account_type: "User".to_owned(),
        score: 1.0,
    }
}

/// Builds a search page from users, deriving `has_more` from the total.
#[must_use]
pub fn search_page(users: Vec<UserSummary>, page: u32, per_page: u8, total: u64) -> SearchPage {
    SearchPage {
        total_count: total,
        has_more: next_page(page, per_page, total).is_some(),
        items: users,
        page,
        per_page,
        rate_limit: None,
        error: None,
    }
}
