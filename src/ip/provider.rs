//! Lookup provider strategies.
//!
//! Every provider is a single `GET` returning provider-specific JSON. The
//! detailed provider yields a full [`IpLookupResult`]; IP-only providers
//! yield just an address, which is wrapped with `"Unknown"` location fields.

use serde::Deserialize;
use serde_json::Value;

use crate::config::UNKNOWN;
use crate::error_handling::{categorize_reqwest_error, ProviderError};

use super::types::IpLookupResult;
use super::validate::is_valid_ip;

/// Field names under which IP-only providers report the address, in the
/// order they are consulted.
const IP_FIELDS: &[&str] = &["ip", "query", "IPv4"];

/// How a provider's response body is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// ipapi.co-shaped body with location, timezone and ISP
    Detailed,
    /// Body carrying only the address under one of [`IP_FIELDS`]
    IpOnly,
}

/// A lookup endpoint and the shape of its response.
#[derive(Debug, Clone)]
pub struct Provider {
    pub url: String,
    pub kind: ProviderKind,
}

impl Provider {
    pub fn detailed(url: impl Into<String>) -> Self {
        Provider {
            url: url.into(),
            kind: ProviderKind::Detailed,
        }
    }

    pub fn ip_only(url: impl Into<String>) -> Self {
        Provider {
            url: url.into(),
            kind: ProviderKind::IpOnly,
        }
    }

    /// Queries the provider once.
    ///
    /// Non-success statuses, transport errors, undecodable bodies and
    /// addresses failing validation all come back as `ProviderError`.
    pub async fn lookup(&self, client: &reqwest::Client) -> Result<IpLookupResult, ProviderError> {
        let body = self.fetch_json(client).await?;
        match self.kind {
            ProviderKind::Detailed => parse_detailed(&self.url, body),
            ProviderKind::IpOnly => parse_ip_only(&self.url, &body).map(IpLookupResult::ip_only),
        }
    }

    async fn fetch_json(&self, client: &reqwest::Client) -> Result<Value, ProviderError> {
        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| categorize_reqwest_error(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| categorize_reqwest_error(&self.url, e))?;
        serde_json::from_str(&text).map_err(|e| ProviderError::Malformed {
            url: self.url.clone(),
            reason: e.to_string(),
        })
    }
}

/// Body returned by the detailed geolocation provider.
#[derive(Debug, Deserialize)]
struct DetailedResponse {
    ip: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
    country_code: Option<String>,
    timezone: Option<String>,
    org: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

fn parse_detailed(url: &str, body: Value) -> Result<IpLookupResult, ProviderError> {
    let data: DetailedResponse =
        serde_json::from_value(body).map_err(|e| ProviderError::Malformed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    // ipapi.co reports quota exhaustion as `{"error": true, "reason": ...}` with HTTP 200
    if data.error {
        return Err(ProviderError::Malformed {
            url: url.to_string(),
            reason: data
                .reason
                .unwrap_or_else(|| "provider reported an error".to_string()),
        });
    }

    let ip = validated_ip(url, data.ip.as_deref())?;

    Ok(IpLookupResult {
        ip,
        city: or_unknown(data.city),
        region: or_unknown(data.region),
        country: or_unknown(data.country_name),
        country_code: or_unknown(data.country_code),
        timezone: or_unknown(data.timezone),
        isp: or_unknown(data.org),
        latitude: data.latitude,
        longitude: data.longitude,
    })
}

/// Picks the first non-empty string among [`IP_FIELDS`] and validates it.
fn parse_ip_only(url: &str, body: &Value) -> Result<String, ProviderError> {
    let candidate = IP_FIELDS
        .iter()
        .filter_map(|field| body.get(*field).and_then(Value::as_str))
        .find(|value| !value.trim().is_empty());
    validated_ip(url, candidate)
}

fn validated_ip(url: &str, candidate: Option<&str>) -> Result<String, ProviderError> {
    let value = candidate
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ProviderError::MissingIp {
            url: url.to_string(),
        })?;
    if is_valid_ip(value) {
        Ok(value.to_string())
    } else {
        Err(ProviderError::InvalidIp {
            url: url.to_string(),
            value: value.to_string(),
        })
    }
}

fn or_unknown(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
