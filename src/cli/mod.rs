//! CLI orchestration: build a controller, page through results, render.

mod output;

pub use output::{render_json, render_table};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::ScoutConfig;
use crate::github::error::SearchError;
use crate::github::filters::AccessToken;
use crate::github::gateway::{FixtureSearchGateway, HttpSearchGateway, SearchGateway};
use crate::github::query::query_key;
use crate::search::controller::{LoadOutcome, SearchController};

/// Runs one search session: fetch the first page, emulate `pages`
/// load-more triggers, and render the accumulated results.
///
/// # Errors
///
/// Returns a [`SearchError`] when configuration is unusable or the
/// first page cannot be fetched; load-more failures are rendered as
/// part of the result state instead.
pub async fn run(config: &ScoutConfig) -> Result<(), SearchError> {
    let filters = config.filters();
    let gateway = build_gateway(config)?;

    let controller = SearchController::new(Arc::clone(&gateway), filters.clone());
    let first = gateway
        .fetch_page(&filters, CancellationToken::new())
        .await?;
    let key = query_key(&filters);
    controller.hydrate(first, filters, key).await;

    for _ in 0..config.pages {
        match controller.load_next().await {
            LoadOutcome::Loaded => {}
            LoadOutcome::Skipped
            | LoadOutcome::Failed
            | LoadOutcome::Cancelled
            | LoadOutcome::Superseded => break,
        }
    }

    controller
        .with_state(|state| {
            if config.json {
                render_json(state)
            } else {
                render_table(state)
            }
        })
        .await
}

fn build_gateway(config: &ScoutConfig) -> Result<Arc<dyn SearchGateway>, SearchError> {
    if config.mock {
        return Ok(Arc::new(FixtureSearchGateway::default()));
    }
    let token = AccessToken::new(config.resolve_token()?)?;
    let gateway = HttpSearchGateway::new(&token, config.api_base(), config.retry_policy())?;
    Ok(Arc::new(gateway))
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests panic on failure")]
mod tests {
    use super::{build_gateway, run};
    use crate::config::ScoutConfig;
    use crate::github::error::SearchError;

    #[test]
    fn mock_mode_needs_no_token() {
        let config = ScoutConfig {
            mock: true,
            ..ScoutConfig::default()
        };
        build_gateway(&config).expect("fixture gateway should build without a token");
    }

    #[tokio::test]
    async fn mock_run_pages_through_the_fixture() {
        let config = ScoutConfig {
            mock: true,
            query: Some("perPage=2".to_owned()),
            pages: 3,
            json: true,
            ..ScoutConfig::default()
        };
        run(&config).await.expect("mock run should succeed");
    }

    #[test]
    fn live_mode_requires_a_token() {
        let config = ScoutConfig {
            token: Some("   ".to_owned()),
            ..ScoutConfig::default()
        };
        let error = build_gateway(&config)
            .err()
            .expect("blank token should be rejected");
        assert_eq!(error, SearchError::MissingToken);
    }
}
