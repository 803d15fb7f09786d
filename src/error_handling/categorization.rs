//! Error categorization.
//!
//! Maps transport-level `reqwest` errors onto `ProviderError` variants.

use super::types::ProviderError;

/// Categorizes a `reqwest::Error` raised while talking to `url`.
///
/// HTTP status failures are built by the caller and never reach here.
/// Timeouts take precedence over connect errors since a connect timeout
/// reports both.
pub fn categorize_reqwest_error(url: &str, error: reqwest::Error) -> ProviderError {
    let url = url.to_string();
    if error.is_timeout() {
        ProviderError::Timeout { url }
    } else if error.is_connect() {
        ProviderError::Connect { url, source: error }
    } else if error.is_decode() {
        ProviderError::Malformed {
            url,
            reason: error.to_string(),
        }
    } else {
        ProviderError::Request { url, source: error }
    }
}
