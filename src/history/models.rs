//! User and login-history records.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::config::{IP_DETECTION_FAILED, UNKNOWN};
use crate::ip::{is_valid_ip, IpLookupResult};
use crate::utils::sanitize::sanitize_field;

/// Account role.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Instructor,
    Admin,
}

/// One successful login, as persisted in a user's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginHistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub ip_address: String,
    pub city: String,
    pub country: String,
    pub isp: String,
}

/// Snapshot of the most recent login; always equal to the last history entry.
pub type LastLogin = LoginHistoryEntry;

/// A registered user with the "last login" projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<LastLogin>,
    #[serde(rename = "lastLoginIP")]
    pub last_login_ip: Option<String>,
    pub last_login_timestamp: Option<DateTime<Utc>>,
}

/// Location details attached to a login submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpDetails {
    pub city: Option<String>,
    pub country: Option<String>,
    pub isp: Option<String>,
    pub timezone: Option<String>,
}

/// Login submission: credentials identity plus the client's IP bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub ip_address: String,
    pub ip_details: Option<IpDetails>,
}

impl LoginRequest {
    /// Builds the submission from an optional resolved bundle.
    ///
    /// Without a bundle the address is `"Unknown"` and no details are sent.
    pub fn with_lookup(email: impl Into<String>, lookup: Option<&IpLookupResult>) -> Self {
        LoginRequest {
            email: email.into(),
            ip_address: lookup
                .map(|l| l.ip.clone())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            ip_details: lookup.map(|l| IpDetails {
                city: Some(l.city.clone()),
                country: Some(l.country.clone()),
                isp: Some(l.isp.clone()),
                timezone: Some(l.timezone.clone()),
            }),
        }
    }
}

impl LoginHistoryEntry {
    /// Builds a history entry from client-supplied login metadata.
    ///
    /// The address is kept only if it is a valid IP or the detection-failed
    /// sentinel; anything else is stored as `"Unknown"`. Location fields are
    /// sanitized.
    pub fn from_request(request: &LoginRequest, timestamp: DateTime<Utc>) -> Self {
        let ip = request.ip_address.trim();
        let ip_address = if is_valid_ip(ip) || ip == IP_DETECTION_FAILED {
            ip.to_string()
        } else {
            if !ip.is_empty() && ip != UNKNOWN {
                log::debug!("Discarding malformed client IP address {:?}", ip);
            }
            UNKNOWN.to_string()
        };
        let details = request.ip_details.as_ref();

        LoginHistoryEntry {
            timestamp,
            ip_address,
            city: sanitize_field(details.and_then(|d| d.city.as_deref())),
            country: sanitize_field(details.and_then(|d| d.country.as_deref())),
            isp: sanitize_field(details.and_then(|d| d.isp.as_deref())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 4, 8, 30, 0).unwrap()
    }

    fn google() -> IpLookupResult {
        IpLookupResult {
            ip: "8.8.8.8".into(),
            city: "Mountain View".into(),
            region: "California".into(),
            country: "United States".into(),
            country_code: "US".into(),
            timezone: "America/Los_Angeles".into(),
            isp: "Google LLC".into(),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_role_string_forms() {
        assert_eq!(Role::Instructor.to_string(), "instructor");
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("superuser".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::Student);
    }

    #[test]
    fn test_login_request_from_lookup() {
        let request = LoginRequest::with_lookup("ada@example.com", Some(&google()));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["ipAddress"], "8.8.8.8");
        assert_eq!(json["ipDetails"]["city"], "Mountain View");
        assert_eq!(json["ipDetails"]["timezone"], "America/Los_Angeles");
    }

    #[test]
    fn test_login_request_without_lookup() {
        let request = LoginRequest::with_lookup("ada@example.com", None);
        assert_eq!(request.ip_address, "Unknown");
        assert_eq!(request.ip_details, None);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json["ipDetails"].is_null());
    }

    #[test]
    fn test_entry_from_request() {
        let request = LoginRequest::with_lookup("ada@example.com", Some(&google()));
        let entry = LoginHistoryEntry::from_request(&request, ts());
        assert_eq!(
            entry,
            LoginHistoryEntry {
                timestamp: ts(),
                ip_address: "8.8.8.8".into(),
                city: "Mountain View".into(),
                country: "United States".into(),
                isp: "Google LLC".into(),
            }
        );
    }

    #[test]
    fn test_entry_keeps_sentinel_and_defaults_details() {
        let request = LoginRequest {
            email: "ada@example.com".into(),
            ip_address: "IP Detection Failed".into(),
            ip_details: None,
        };
        let entry = LoginHistoryEntry::from_request(&request, ts());
        assert_eq!(entry.ip_address, "IP Detection Failed");
        assert_eq!(entry.city, "Unknown");
        assert_eq!(entry.country, "Unknown");
        assert_eq!(entry.isp, "Unknown");
    }

    #[test]
    fn test_entry_discards_malformed_ip() {
        let request = LoginRequest {
            email: "ada@example.com".into(),
            ip_address: "'; DROP TABLE users; --".into(),
            ip_details: Some(IpDetails {
                city: Some("Oslo\r\n".into()),
                country: None,
                isp: Some("".into()),
                timezone: None,
            }),
        };
        let entry = LoginHistoryEntry::from_request(&request, ts());
        assert_eq!(entry.ip_address, "Unknown");
        assert_eq!(entry.city, "Oslo");
        assert_eq!(entry.isp, "Unknown");
    }

    #[test]
    fn test_user_serializes_projection_names() {
        let user = User {
            id: 1,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: Role::Admin,
            created_at: ts(),
            last_login: None,
            last_login_ip: Some("8.8.8.8".into()),
            last_login_timestamp: Some(ts()),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["lastLoginIP"], "8.8.8.8");
        assert_eq!(json["role"], "admin");
        assert!(json.get("lastLoginTimestamp").is_some());
    }
}
