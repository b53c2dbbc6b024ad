//! Integration tests for SSH credential validation (§4.3 "Credential
//! validation").

use mcp_exec_daemon::security::credentials::validate_ssh_credentials;

#[test]
fn accepts_valid_credentials() {
    assert!(validate_ssh_credentials("203.0.113.5", "Administrator", "s3cret-pw").is_ok());
}

#[test]
fn rejects_hostname_targets() {
    assert!(validate_ssh_credentials("example.com", "admin", "pw").is_err());
}

#[test]
fn rejects_sql_markers_in_username() {
    assert!(validate_ssh_credentials("203.0.113.5", "admin' OR 1=1 --", "pw").is_err());
}

#[test]
fn rejects_empty_password() {
    assert!(validate_ssh_credentials("203.0.113.5", "admin", "").is_err());
}

#[test]
fn rejects_oversized_username() {
    let long = "a".repeat(65);
    assert!(validate_ssh_credentials("203.0.113.5", &long, "pw").is_err());
}
