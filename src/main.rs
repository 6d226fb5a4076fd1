//! Scout CLI entrypoint for GitHub user search.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use scout::{ScoutConfig, SearchError};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), SearchError> {
    let config = load_config()?;
    scout::cli::run(&config).await
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`SearchError::Configuration`] when ortho-config fails to
/// parse arguments or load configuration files.
fn load_config() -> Result<ScoutConfig, SearchError> {
    ScoutConfig::load().map_err(|error| SearchError::Configuration {
        message: error.to_string(),
    })
}
