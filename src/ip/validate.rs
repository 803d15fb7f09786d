//! Strict IPv4/IPv6 address validation.

use regex::Regex;
use std::sync::LazyLock;

/// Dotted quad with every octet in 0..=255 and no leading zeros.
static IPV4_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])$")
        .expect("IPv4 pattern is valid")
});

/// Full and `::`-compressed IPv6 forms (no zone index, no embedded IPv4).
static IPV6_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(",
        r"([0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}",
        r"|([0-9a-fA-F]{1,4}:){1,7}:",
        r"|([0-9a-fA-F]{1,4}:){1,6}:[0-9a-fA-F]{1,4}",
        r"|([0-9a-fA-F]{1,4}:){1,5}(:[0-9a-fA-F]{1,4}){1,2}",
        r"|([0-9a-fA-F]{1,4}:){1,4}(:[0-9a-fA-F]{1,4}){1,3}",
        r"|([0-9a-fA-F]{1,4}:){1,3}(:[0-9a-fA-F]{1,4}){1,4}",
        r"|([0-9a-fA-F]{1,4}:){1,2}(:[0-9a-fA-F]{1,4}){1,5}",
        r"|[0-9a-fA-F]{1,4}:(:[0-9a-fA-F]{1,4}){1,6}",
        r"|:((:[0-9a-fA-F]{1,4}){1,7}|:)",
        r")$"
    ))
    .expect("IPv6 pattern is valid")
});

/// Returns `true` if `ip` is a syntactically valid IPv4 or IPv6 address.
pub fn is_valid_ip(ip: &str) -> bool {
    IPV4_PATTERN.is_match(ip) || IPV6_PATTERN.is_match(ip)
}
