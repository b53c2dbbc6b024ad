//! Integration tests for IP literal validation and CIDR containment (§4.3
//! "IP validation", §4.1 Stage E).

use std::net::IpAddr;

use mcp_exec_daemon::security::ip::{is_allowed, matches_allowlist_entry, validate_ip_address};

#[test]
fn accepts_plain_ipv4() {
    assert!(validate_ip_address("203.0.113.5", false).is_ok());
}

#[test]
fn rejects_hostnames() {
    assert!(validate_ip_address("example.com", false).is_err());
}

#[test]
fn rejects_loopback_unless_caller_is_localhost() {
    assert!(validate_ip_address("127.0.0.1", false).is_err());
    assert!(validate_ip_address("127.0.0.1", true).is_ok());
}

#[test]
fn normalizes_ipv4_mapped_ipv6() {
    let result = validate_ip_address("::ffff:203.0.113.5", false).unwrap();
    assert_eq!(result.to_string(), "203.0.113.5");
}

#[test]
fn rejects_link_local_and_multicast() {
    assert!(validate_ip_address("169.254.1.1", false).is_err());
    assert!(validate_ip_address("224.0.0.1", false).is_err());
}

#[test]
fn slash_zero_accepts_any_ip() {
    let ip: IpAddr = "8.8.8.8".parse().unwrap();
    assert!(matches_allowlist_entry(&ip, "0.0.0.0/0"));
}

#[test]
fn slash_32_matches_only_the_exact_literal() {
    let ip: IpAddr = "10.0.0.5".parse().unwrap();
    assert!(matches_allowlist_entry(&ip, "10.0.0.5/32"));
    assert!(!matches_allowlist_entry(&ip, "10.0.0.6/32"));
}

#[test]
fn non_byte_aligned_prefix_uses_bitwise_containment() {
    // 10.0.0.0/20 covers 10.0.0.0 - 10.0.15.255.
    let inside: IpAddr = "10.0.15.200".parse().unwrap();
    let outside: IpAddr = "10.0.16.1".parse().unwrap();
    assert!(matches_allowlist_entry(&inside, "10.0.0.0/20"));
    assert!(!matches_allowlist_entry(&outside, "10.0.0.0/20"));
}

#[test]
fn empty_allowlist_allows_everyone() {
    let ip: IpAddr = "1.2.3.4".parse().unwrap();
    assert!(is_allowed(&ip, &[]));
}
