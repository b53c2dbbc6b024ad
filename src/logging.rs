//! Structured access/security logging (§4.1 Stage B, §4.6, §8 invariants).
//!
//! Every record goes through `tracing`, never a raw `println!`, so it picks
//! up whatever subscriber `main` installs (stderr in development, rotated
//! newline-delimited JSON files in production). Fields that could leak
//! secrets are fingerprinted, never logged in full -- see
//! [`partial_fingerprint`].

use std::time::Duration;

/// One line of the access log (§4.1 Stage B).
pub struct AccessLogRecord<'a> {
    pub client_ip: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub user_agent: Option<&'a str>,
    pub duration: Duration,
    pub status: u16,
}

pub fn log_access(record: &AccessLogRecord<'_>) {
    tracing::info!(
        client_ip = record.client_ip,
        http_method = record.method,
        path = record.path,
        user_agent = record.user_agent.unwrap_or("-"),
        duration_ms = record.duration.as_secs_f64() * 1000.0,
        status = record.status,
        "access"
    );
}

/// Fingerprint a secret for correlation in security logs without revealing
/// it: `first4…last4`, or the literal `"too short"` when under 8 bytes.
///
/// This is the *only* representation of a bearer token or SSH password that
/// may appear in a log line (§4.1 Stage F, §4.5, invariant in §8).
pub fn partial_fingerprint(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() < 8 {
        return "too short".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

pub fn log_auth_failure(expected: &str, received: &str, client_ip: &str) {
    tracing::warn!(
        client_ip,
        expected_fingerprint = %partial_fingerprint(expected),
        received_fingerprint = %partial_fingerprint(received),
        "authentication failed"
    );
}

pub fn log_rate_limit_bypassed(client_ip: &str) {
    tracing::warn!(client_ip, "dangerous mode: rate limiting bypassed");
}

pub fn log_dangerous_command(client_ip: &str, command: &str) {
    tracing::warn!(
        client_ip,
        command,
        "dangerous mode: command validation bypassed"
    );
}

pub fn log_ssh_attempt(host: &str, password: &str) {
    tracing::info!(
        host,
        password_fingerprint = %partial_fingerprint(password),
        "ssh authentication attempt"
    );
}
