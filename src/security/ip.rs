//! IP literal validation and CIDR containment (§4.3 "IP validation", §4.1
//! Stage E).
//!
//! The spec's Open Question about octet-truncated CIDR matching is resolved
//! here (see `SPEC_FULL.md` §9 decision 1) by using proper bitwise prefix
//! masking via `ipnet`, which is also what "standard CIDR containment"
//! means in the boundary tests (`/0` matches everything, `/32`/`/128` match
//! only the exact literal).

use std::net::IpAddr;

use ipnet::IpNet;

use super::ValidationError;

fn blocked_ranges() -> Vec<IpNet> {
    [
        "0.0.0.0/8",
        "127.0.0.0/8",
        "169.254.0.0/16",
        "224.0.0.0/4",
        "::1/128",
        "fe80::/10",
        "ff00::/8",
    ]
    .iter()
    .map(|s| s.parse().expect("static CIDR literal"))
    .collect()
}

/// `validateIPAddress` (§4.3): parse as a literal IPv4/IPv6 address,
/// normalizing IPv4-mapped IPv6 (`::ffff:a.b.c.d`), and reject addresses in
/// a blocked range unless the caller is itself on localhost.
pub fn validate_ip_address(raw: &str, caller_is_localhost: bool) -> Result<IpAddr, ValidationError> {
    let addr: IpAddr = raw.parse().map_err(|_| ValidationError::Ip {
        reason: format!("{raw} is not a valid IPv4/IPv6 literal (hostnames are rejected)"),
    })?;

    let normalized = match addr {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(addr),
        other => other,
    };

    let is_localhost = matches!(normalized, IpAddr::V4(v4) if v4.is_loopback())
        || matches!(normalized, IpAddr::V6(v6) if v6.is_loopback());

    if is_localhost && caller_is_localhost {
        return Ok(normalized);
    }

    for range in blocked_ranges() {
        if range.contains(&normalized) {
            return Err(ValidationError::Ip {
                reason: format!("{normalized} falls in the blocked range {range}"),
            });
        }
    }

    Ok(normalized)
}

/// Standard CIDR containment check used by the IP allowlist (§4.1 Stage E).
/// `entry` may be a bare literal (exact match) or a `a.b.c.d/n` /
/// `host:.../n` CIDR block.
pub fn matches_allowlist_entry(client_ip: &IpAddr, entry: &str) -> bool {
    if let Ok(net) = entry.parse::<IpNet>() {
        return net.contains(client_ip);
    }
    entry
        .parse::<IpAddr>()
        .map(|literal| literal == *client_ip)
        .unwrap_or(false)
}

pub fn is_allowed(client_ip: &IpAddr, allowed_ips: &[String]) -> bool {
    allowed_ips.is_empty() || allowed_ips.iter().any(|e| matches_allowlist_entry(client_ip, e))
}
