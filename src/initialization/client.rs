//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::ClientBuilder;

use crate::config::Config;
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used for provider lookups.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the configuration
/// - Per-request timeout from the configuration
/// - `Accept: application/json` on every request
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails,
/// e.g. when the User-Agent is not a valid header value.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, InitializationError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .build()?;
    Ok(Arc::new(client))
}
