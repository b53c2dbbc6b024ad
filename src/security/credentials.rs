//! SSH credential validation (§4.3 "Credential validation").

use std::sync::LazyLock;

use regex::Regex;

use super::ip::validate_ip_address;
use super::ValidationError;

const SQL_INJECTION_MARKERS: &[&str] = &["'", ";", "--", "union", "or 1=1"];

static SQL_UNION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bunion\b|\bor\s+1\s*=\s*1\b").expect("sql pattern"));

fn reject_injection_markers(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        return Err(ValidationError::Credential {
            reason: format!("{field} contains a null byte"),
        });
    }
    if !value.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
        return Err(ValidationError::Credential {
            reason: format!("{field} contains non-printable characters"),
        });
    }
    if SQL_UNION_PATTERN.is_match(value) {
        return Err(ValidationError::Credential {
            reason: format!("{field} contains a SQL-injection marker"),
        });
    }
    for marker in SQL_INJECTION_MARKERS {
        if marker.len() <= 2 && value.contains(marker) {
            return Err(ValidationError::Credential {
                reason: format!("{field} contains a disallowed character sequence: {marker}"),
            });
        }
    }
    Ok(())
}

/// `validateSSHCredentials` (§4.3): returns `(host, username, password)`
/// verbatim on success.
pub fn validate_ssh_credentials(
    host: &str,
    username: &str,
    password: &str,
) -> Result<(String, String, String), ValidationError> {
    validate_ip_address(host, false).map_err(|e| ValidationError::Credential {
        reason: format!("host: {e}"),
    })?;

    if !(1..=64).contains(&username.len()) {
        return Err(ValidationError::Credential {
            reason: "username must be 1-64 characters".to_string(),
        });
    }
    reject_injection_markers(username, "username")?;

    if !(1..=128).contains(&password.len()) {
        return Err(ValidationError::Credential {
            reason: "password must be 1-128 characters".to_string(),
        });
    }
    reject_injection_markers(password, "password")?;

    Ok((host.to_string(), username.to_string(), password.to_string()))
}
