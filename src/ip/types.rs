//! IP lookup data structures.

use serde::{Deserialize, Serialize};

use crate::config::{IP_DETECTION_FAILED, UNKNOWN, UNKNOWN_COUNTRY_CODE};

/// Public IP address and coarse geolocation of the client.
///
/// `ip` is always either an address that passed [`super::is_valid_ip`] or the
/// [`IP_DETECTION_FAILED`] sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpLookupResult {
    pub ip: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub country_code: String,
    pub timezone: String,
    pub isp: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl IpLookupResult {
    /// Result for an address obtained from an IP-only provider.
    pub fn ip_only(ip: String) -> Self {
        IpLookupResult {
            ip,
            city: UNKNOWN.to_string(),
            region: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            country_code: UNKNOWN_COUNTRY_CODE.to_string(),
            timezone: UNKNOWN.to_string(),
            isp: UNKNOWN.to_string(),
            latitude: None,
            longitude: None,
        }
    }

    /// The degraded result returned when every provider failed.
    pub fn detection_failed() -> Self {
        Self::ip_only(IP_DETECTION_FAILED.to_string())
    }

    pub fn is_detection_failed(&self) -> bool {
        self.ip == IP_DETECTION_FAILED
    }
}
