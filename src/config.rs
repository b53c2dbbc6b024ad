//! Process-wide server configuration, loaded once at startup from the
//! environment (§3, §6) and never mutated afterwards.

use std::env;
use std::time::Duration;

/// Sentinel value meaning "no token configured" -- matches what a naive
/// `.env.example` ships, so a deployer who never edits the template still
/// gets auth disabled rather than locked out with an unusable default.
const DEFAULT_TOKEN_SENTINEL: &str = "change-me";

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

#[derive(Debug, Clone)]
pub struct ModesConfig {
    pub dangerous: bool,
    pub dev_commands: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub auth_token: Option<String>,
    pub allowed_ips: Vec<String>,
    pub allowed_origins: Vec<String>,
    pub rate_limit: RateLimitConfig,
    pub command_timeout: Duration,
    pub max_allowed_timeout: Duration,
    pub ssh_timeout: Duration,
    pub allowed_build_paths: Vec<String>,
    pub allowed_batch_dirs: Vec<String>,
    pub dev_command_paths: Vec<String>,
    pub allowed_dev_commands: Vec<String>,
    pub allowed_file_encoding_extensions: Vec<String>,
    pub max_encoding_bytes: u64,
    pub remote_username: String,
    pub remote_password: Option<String>,
    pub known_remote_hosts: Vec<String>,
    pub modes: ModesConfig,
    pub max_command_length: usize,
    pub preferred_port: PortPreference,
    pub server_version: String,
    pub server_name: String,
}

#[derive(Debug, Clone)]
pub enum PortPreference {
    Auto,
    Fixed(u16),
}

impl ServerConfig {
    /// Build configuration from the environment, per the variable table in
    /// §6. Hard failures (malformed numeric values) are rejected; soft
    /// misconfigurations are logged as warnings by [`Self::warn_on_startup`],
    /// never rejected, per §4.8.
    pub fn from_env() -> anyhow::Result<Self> {
        let auth_token = match env::var("MCP_AUTH_TOKEN") {
            Ok(v) if v.is_empty() || v == DEFAULT_TOKEN_SENTINEL => None,
            Ok(v) => Some(v),
            Err(_) => None,
        };

        let rate_limit = RateLimitConfig {
            max_requests: parse_env_or("RATE_LIMIT_REQUESTS", 100)?,
            window: Duration::from_millis(parse_env_or("RATE_LIMIT_WINDOW", 60_000)?),
        };

        let command_timeout = Duration::from_millis(parse_env_or("COMMAND_TIMEOUT", 300_000)?);
        let max_allowed_timeout =
            Duration::from_millis(parse_env_or("MAX_ALLOWED_TIMEOUT", 1_800_000)?);
        let ssh_timeout = Duration::from_millis(parse_env_or("SSH_TIMEOUT", 30_000)?);

        if max_allowed_timeout < command_timeout {
            anyhow::bail!(
                "MAX_ALLOWED_TIMEOUT ({:?}) must be >= COMMAND_TIMEOUT ({:?})",
                max_allowed_timeout,
                command_timeout
            );
        }

        let preferred_port = match env::var("MCP_SERVER_PORT").ok().as_deref() {
            None | Some("") | Some("auto") => PortPreference::Auto,
            Some(v) => PortPreference::Fixed(v.parse().map_err(|_| {
                anyhow::anyhow!("MCP_SERVER_PORT must be \"auto\" or a valid port number")
            })?),
        };

        Ok(Self {
            auth_token,
            allowed_ips: split_csv_env("ALLOWED_IPS"),
            allowed_origins: split_csv_env("ALLOWED_ORIGINS"),
            rate_limit,
            command_timeout,
            max_allowed_timeout,
            ssh_timeout,
            allowed_build_paths: split_csv_env("ALLOWED_BUILD_PATHS"),
            allowed_batch_dirs: split_csv_env("ALLOWED_BATCH_DIRS"),
            dev_command_paths: split_csv_env("DEV_COMMAND_PATHS"),
            allowed_dev_commands: split_csv_env("ALLOWED_DEV_COMMANDS"),
            allowed_file_encoding_extensions: split_csv_env("FILE_ENCODING_ALLOWED_EXTENSIONS"),
            max_encoding_bytes: parse_env_or("FILE_ENCODING_MAX_SIZE", 10_485_760)?,
            remote_username: env::var("REMOTE_USERNAME").unwrap_or_else(|_| "Administrator".to_string()),
            remote_password: env::var("REMOTE_PASSWORD").ok().filter(|v| !v.is_empty()),
            known_remote_hosts: split_csv_env("NORDVPN_HOSTS"),
            modes: ModesConfig {
                dangerous: parse_bool_env("ENABLE_DANGEROUS_MODE"),
                dev_commands: parse_bool_env("ENABLE_DEV_COMMANDS"),
            },
            max_command_length: parse_env_or("MAX_COMMAND_LENGTH", 8192)?,
            preferred_port,
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            server_name: "mcp-exec-daemon".to_string(),
        })
    }

    /// Log (never fail on) production misconfigurations, per §4.8.
    pub fn warn_on_startup(&self) {
        if self.auth_token.is_none() {
            tracing::warn!("MCP_AUTH_TOKEN is not set; authentication is disabled");
        }
        if self.allowed_ips.is_empty() {
            tracing::warn!("ALLOWED_IPS is empty; any client IP is accepted");
        }
        if self.remote_password.is_none() && !self.known_remote_hosts.is_empty() {
            tracing::warn!(
                "NORDVPN_HOSTS is configured but REMOTE_PASSWORD is not set; SSH tools will fail"
            );
        }
        if self.modes.dangerous {
            tracing::warn!("ENABLE_DANGEROUS_MODE is set; validation and rate limiting are bypassed");
        }
    }
}

fn split_csv_env(name: &str) -> Vec<String> {
    env::var(name)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool_env(name: &str) -> bool {
    matches!(
        env::var(name).ok().as_deref(),
        Some("1") | Some("true") | Some("TRUE") | Some("yes")
    )
}

fn parse_env_or<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match env::var(name) {
        Ok(v) if !v.is_empty() => v
            .parse()
            .map_err(|_| anyhow::anyhow!("{name} is not a valid value")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_token_sentinel_disables_auth() {
        // SAFETY: tests run single-threaded per-module by default in this crate's suite.
        unsafe {
            env::set_var("MCP_AUTH_TOKEN", DEFAULT_TOKEN_SENTINEL);
        }
        let cfg = ServerConfig::from_env().unwrap();
        assert!(cfg.auth_token.is_none());
        unsafe {
            env::remove_var("MCP_AUTH_TOKEN");
        }
    }

    #[test]
    fn max_allowed_timeout_must_not_be_below_command_timeout() {
        unsafe {
            env::set_var("COMMAND_TIMEOUT", "60000");
            env::set_var("MAX_ALLOWED_TIMEOUT", "1000");
        }
        let err = ServerConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("MAX_ALLOWED_TIMEOUT"));
        unsafe {
            env::remove_var("COMMAND_TIMEOUT");
            env::remove_var("MAX_ALLOWED_TIMEOUT");
        }
    }
}
