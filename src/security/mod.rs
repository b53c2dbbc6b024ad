//! Security validator (§4.3): policy checks over paths, commands, IPs, and
//! credentials. This narrows the blast radius of argv-based execution; it
//! is not a sandbox.

pub mod command;
pub mod credentials;
pub mod ip;
pub mod path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("path validation failed: {path} is not under any of the allowed prefixes {allowed:?}")]
    Path {
        path: String,
        allowed: Vec<String>,
    },

    #[error("command validation failed: {reason}")]
    Command { reason: String },

    #[error("IP validation failed: {reason}")]
    Ip { reason: String },

    #[error("credential validation failed: {reason}")]
    Credential { reason: String },
}

impl ValidationError {
    /// Render as the `"Validation error: "`-prefixed MCP text result the
    /// dispatcher always produces for validator failures (§4.3, §9), with a
    /// remediation hint appended.
    pub fn to_mcp_text(&self) -> String {
        let hint = match self {
            ValidationError::Path { .. } => {
                "add the path to ALLOWED_BUILD_PATHS or ALLOWED_BATCH_DIRS"
            }
            ValidationError::Command { .. } => {
                "enable development mode (ENABLE_DEV_COMMANDS) if this command is expected"
            }
            ValidationError::Ip { .. } => "check the host literal and blocked IP ranges",
            ValidationError::Credential { .. } => "check the SSH username/password for invalid characters",
        };
        format!("Validation error: {self} ({hint})")
    }
}
