//! Entry point for the Press Estimator binary.
//!
//! Running this binary starts an HTTP server exposing the estimation
//! API.  The catalog directory and bind address come from
//! `PRESS_CATALOG_DIR` and `PRESS_BIND_ADDR` (see
//! [`press_estimator::config`]); log output is filtered by `RUST_LOG`.

use press_estimator::{api, config::Config, logging};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = logging::init() {
        eprintln!("Error initialising logging: {}", err);
    }
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = api::serve(&config).await {
        tracing::error!(error = %err, "server stopped with an error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
