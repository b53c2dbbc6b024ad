//! `ssh_command` (§6 tool table): run a single command on a third-party
//! host with explicit credentials, rather than routing an existing local
//! tool call over SSH (that's what `remoteHost` on the other tools is for).

use serde_json::Value;

use crate::config::ServerConfig;
use crate::result::ExecutionResult;
use crate::security::credentials::validate_ssh_credentials;
use crate::ssh;
use crate::tools::{require_str, ToolError};

pub async fn execute(args: &Value, config: &ServerConfig) -> Result<ExecutionResult, ToolError> {
    let host = require_str(args, "host")?;
    let username = require_str(args, "username")?;
    let password = require_str(args, "password")?;
    let command = require_str(args, "command")?;

    let (host, username, password) = validate_ssh_credentials(host, username, password)?;

    Ok(ssh::execute_ssh_command(&host, &username, &password, command, config.ssh_timeout).await)
}
