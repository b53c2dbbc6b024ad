//! `run_powershell` (§6 tool table, §4.6 argv shape "PowerShell").

use serde_json::Value;

use crate::config::ServerConfig;
use crate::dispatch::BuildCommand;
use crate::process::ProcessOptions;
use crate::security::command::{CommandMode, CommandValidationContext};
use crate::security::{command, ip};
use crate::tools::{optional_str, optional_u64, require_str, ToolError};

fn mode_for(config: &ServerConfig) -> CommandMode {
    if config.modes.dangerous {
        CommandMode::Dangerous
    } else if config.modes.dev_commands {
        CommandMode::Dev
    } else {
        CommandMode::Normal
    }
}

pub fn assemble(args: &Value, config: &ServerConfig) -> Result<BuildCommand, ToolError> {
    let raw_command = require_str(args, "command")?;

    let ctx = CommandValidationContext {
        mode: mode_for(config),
        dev_command_paths: &config.dev_command_paths,
        allowed_dev_commands: &config.allowed_dev_commands,
        max_command_length: config.max_command_length,
    };
    let validated = command::validate_powershell_command(raw_command, &ctx)?;

    let remote_host = match optional_str(args, "remoteHost") {
        Some(host) => {
            ip::validate_ip_address(host, false)?;
            Some(host.to_string())
        }
        None => None,
    };

    let clamped_timeout_secs = optional_u64(args, "timeout").map(|secs| {
        secs.clamp(1, config.max_allowed_timeout.as_secs().max(1))
    });

    let mut options = ProcessOptions::default();
    if let Some(secs) = clamped_timeout_secs {
        options.timeout = Some(std::time::Duration::from_secs(secs));
    }

    Ok(BuildCommand::local(
        "powershell.exe",
        vec![
            "-NoProfile".to_string(),
            "-NonInteractive".to_string(),
            "-ExecutionPolicy".to_string(),
            "Bypass".to_string(),
            "-Command".to_string(),
            validated,
        ],
        options,
    )
    .with_remote_host(remote_host))
}
