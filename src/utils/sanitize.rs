//! Utilities for sanitizing client-supplied strings.
//!
//! Login metadata arrives from the client and is stored verbatim otherwise,
//! so control characters are removed and lengths capped before persisting.

use crate::config::{MAX_LOCATION_FIELD_LENGTH, UNKNOWN};

/// Removes control characters (0x00-0x1F and 0x7F), including newlines.
pub fn strip_control_chars(value: &str) -> String {
    value.chars().filter(|c| !c.is_control()).collect()
}

/// Sanitizes a location/ISP field for storage.
///
/// Control characters are stripped, surrounding whitespace trimmed and the
/// result truncated to `MAX_LOCATION_FIELD_LENGTH` characters. Empty or
/// missing input becomes `"Unknown"`.
pub fn sanitize_field(value: Option<&str>) -> String {
    let cleaned = value.map(strip_control_chars).unwrap_or_default();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return UNKNOWN.to_string();
    }
    trimmed.chars().take(MAX_LOCATION_FIELD_LENGTH).collect()
}
