//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges
//! values from command-line arguments, environment variables, and
//! configuration files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence
//! (lowest to highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.scout.toml` in the current directory,
//!    home directory, or XDG config directory
//! 3. **Environment variables** – `SCOUT_QUERY`, `SCOUT_TOKEN`, or
//!    legacy `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--query`/`-q`, `--token`/`-t`, etc.
//!
//! # Configuration File
//!
//! Place `.scout.toml` in the current directory, home directory, or XDG
//! config directory with:
//!
//! ```toml
//! query = "term=john&sort=followers"
//! token = "ghp_example"
//! pages = 2
//! backoff_base_ms = 400
//! ```

use std::env;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::github::error::SearchError;
use crate::github::filters::{SearchFilters, filters_from_query};
use crate::github::rate_limit::{BackoffPolicy, RetryPolicy, ShortCircuitPolicy};

/// Application configuration supporting CLI, environment, and file
/// sources.
///
/// # Environment Variables
///
/// - `SCOUT_QUERY` or `--query`: Search filters as a URL query string
/// - `SCOUT_TOKEN`, `GITHUB_TOKEN`, or `--token`: Authentication token
/// - `SCOUT_API_BASE` or `--api-base`: GitHub API base URL override
/// - `SCOUT_PAGES` or `--pages`: Additional pages to load
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "SCOUT",
    discovery(
        dotfile_name = ".scout.toml",
        config_file_name = "scout.toml",
        app_name = "scout"
    )
)]
pub struct ScoutConfig {
    /// Search filters encoded as a URL query string.
    ///
    /// Recognized keys: `term`, `in`, `type`, `location`, `language`,
    /// `repos`, `followers`, `created`, `sponsorable`, `page`,
    /// `perPage`, `sort`, `order`. Numeric and date values accept an
    /// `<operator><value>` form with `>=` as the default operator.
    ///
    /// Can be provided via:
    /// - CLI: `--query <QUERY>` or `-q <QUERY>`
    /// - Environment: `SCOUT_QUERY`
    /// - Config file: `query = "..."`
    #[ortho_config(cli_short = 'q')]
    pub query: Option<String>,

    /// Search term shortcut; overrides any `term` inside `--query`.
    ///
    /// Can be provided via:
    /// - CLI: `--term <TERM>`
    /// - Environment: `SCOUT_TERM`
    /// - Config file: `term = "..."`
    #[ortho_config(cli_short = 'T')]
    pub term: Option<String>,

    /// Personal access token for GitHub API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `SCOUT_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// GitHub API base URL, for GitHub Enterprise or test servers.
    ///
    /// Defaults to `https://api.github.com`.
    #[ortho_config()]
    pub api_base: Option<String>,

    /// Additional pages to load after the first, emulating successive
    /// infinite-scroll triggers.
    #[ortho_config(cli_short = 'p')]
    pub pages: u32,

    /// Emits the accumulated results as JSON instead of a table.
    #[ortho_config()]
    pub json: bool,

    /// Serves deterministic canned results instead of calling the live
    /// API.
    #[ortho_config()]
    pub mock: bool,

    /// Attempt budget for one logical page request.
    #[ortho_config()]
    pub retry_max_attempts: u32,

    /// Base backoff delay in milliseconds.
    #[ortho_config()]
    pub backoff_base_ms: u64,

    /// Upper bound of the uniform backoff jitter in milliseconds.
    #[ortho_config()]
    pub backoff_jitter_ms: u64,

    /// Seconds-to-reset beyond which a rate-limited request fails fast
    /// instead of retrying.
    #[ortho_config()]
    pub short_circuit_window_secs: u64,
}

const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_BASE_MS: u64 = 400;
const DEFAULT_BACKOFF_JITTER_MS: u64 = 150;
const DEFAULT_SHORT_CIRCUIT_WINDOW_SECS: u64 = 30;

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            query: None,
            term: None,
            token: None,
            api_base: None,
            pages: 0,
            json: false,
            mock: false,
            retry_max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            backoff_jitter_ms: DEFAULT_BACKOFF_JITTER_MS,
            short_circuit_window_secs: DEFAULT_SHORT_CIRCUIT_WINDOW_SECS,
        }
    }
}

impl ScoutConfig {
    /// Resolves the token from configuration or the legacy
    /// `GITHUB_TOKEN` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MissingToken`] when no token source
    /// provides a value.
    pub fn resolve_token(&self) -> Result<String, SearchError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or(SearchError::MissingToken)
    }

    /// Returns the effective API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or(crate::github::gateway::DEFAULT_API_BASE)
    }

    /// Builds the retry policy from the configured knobs.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts,
            backoff: BackoffPolicy::new(
                Duration::from_millis(self.backoff_base_ms),
                Duration::from_millis(self.backoff_jitter_ms),
            ),
            short_circuit: ShortCircuitPolicy::new(Duration::from_secs(
                self.short_circuit_window_secs,
            )),
        }
    }

    /// Builds the initial search filters from `query` and the `term`
    /// shortcut.
    #[must_use]
    pub fn filters(&self) -> SearchFilters {
        let mut filters = self
            .query
            .as_deref()
            .map_or_else(SearchFilters::default, filters_from_query);
        if let Some(term) = &self.term {
            filters.term = term.clone();
        }
        filters
    }
}
