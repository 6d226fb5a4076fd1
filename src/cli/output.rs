//! Rendering of accumulated search results.

use std::io::{self, Write};

use crate::github::error::SearchError;
use crate::search::state::PaginationState;

/// Writes the accumulated results as an aligned text table with a
/// pagination and quota footer.
///
/// # Errors
///
/// Returns [`SearchError::Io`] when stdout cannot be written.
pub fn render_table(state: &PaginationState) -> Result<(), SearchError> {
    let mut stdout = io::stdout().lock();

    let login_width = state
        .items()
        .iter()
        .map(|user| user.login.len())
        .max()
        .unwrap_or(5)
        .max(5);

    write_line(
        &mut stdout,
        &format!("{:<login_width$}  {:<12}  {:>7}  PROFILE", "LOGIN", "TYPE", "SCORE"),
    )?;
    for user in state.items() {
        write_line(
            &mut stdout,
            &format!(
                "{:<login_width$}  {:<12}  {:>7.2}  {}",
                user.login, user.account_type, user.score, user.profile_url
            ),
        )?;
    }

    write_line(
        &mut stdout,
        &format!(
            "{count} of {total} users (page {page}, more: {has_more})",
            count = state.items().len(),
            total = state.total_count(),
            page = state.page(),
            has_more = state.has_more()
        ),
    )?;
    if let Some(quota) = state.rate_limit() {
        let remaining = quota
            .remaining()
            .map_or_else(|| "?".to_owned(), |value| value.to_string());
        let limit = quota
            .limit()
            .map_or_else(|| "?".to_owned(), |value| value.to_string());
        let reset = quota.reset_at().unwrap_or("unknown");
        write_line(
            &mut stdout,
            &format!("quota: {remaining}/{limit}, resets {reset}"),
        )?;
    }
    if let Some(notice) = state.error() {
        write_line(&mut stdout, &format!("error: {}", notice.message))?;
    }
    Ok(())
}

/// Writes the accumulated results as the caller-facing JSON contract:
/// `items`, `totalCount`, `hasMore`, `page`, `perPage`, plus optional
/// `rateLimit` and `error`.
///
/// # Errors
///
/// Returns [`SearchError::Io`] when stdout cannot be written.
pub fn render_json(state: &PaginationState) -> Result<(), SearchError> {
    let mut body = serde_json::Map::new();
    body.insert("items".to_owned(), serde_json::json!(state.items()));
    body.insert("totalCount".to_owned(), serde_json::json!(state.total_count()));
    body.insert("hasMore".to_owned(), serde_json::json!(state.has_more()));
    body.insert("page".to_owned(), serde_json::json!(state.page()));
    body.insert("perPage".to_owned(), serde_json::json!(state.per_page()));
    if let Some(quota) = state.rate_limit() {
        body.insert("rateLimit".to_owned(), serde_json::json!(quota));
    }
    if let Some(notice) = state.error() {
        body.insert("error".to_owned(), serde_json::json!(notice));
    }

    let rendered = serde_json::to_string_pretty(&serde_json::Value::Object(body)).map_err(
        |error| SearchError::Io {
            message: error.to_string(),
        },
    )?;
    let mut stdout = io::stdout().lock();
    write_line(&mut stdout, &rendered)
}

fn write_line(stdout: &mut impl Write, line: &str) -> Result<(), SearchError> {
    writeln!(stdout, "{line}").map_err(|error| SearchError::Io {
        message: error.to_string(),
    })
}
