//! HTTP Client Factory
//!
//! Provides a factory function for building reqwest clients.

use std::time::Duration;

use crate::types::{LlmError, LlmResult};

/// Connection establishment limit; the overall per-call deadline is applied
/// by the caller.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a `reqwest::Client` for provider calls.
///
/// Proxy settings come from the usual environment variables.
pub fn build_http_client() -> LlmResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| LlmError::Configuration {
            message: format!("failed to build HTTP client: {}", e),
        })
}
