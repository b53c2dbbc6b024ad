//! `mcp_self_build` (§4.6 argv shape "mcp_self_build"): manage this
//! daemon's own build/install/update/start/stop/status lifecycle via its
//! installer's PowerShell scripts. `install`/`update` require
//! `modes.dangerous` -- their security surface is the privileged script
//! itself, not argv construction.

use std::time::Duration;

use serde_json::Value;

use crate::config::ServerConfig;
use crate::dispatch::{self, BuildCommand};
use crate::process::ProcessOptions;
use crate::result::ExecutionResult;
use crate::security::ValidationError;
use crate::tools::{require_str, ToolError};

const SELF_BUILD_SCRIPT: &str = "C:\\mcp\\scripts\\self-build.ps1";
const UPDATE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

fn script_command(action: &str) -> BuildCommand {
    BuildCommand::local(
        "powershell.exe",
        vec![
            "-NoProfile".to_string(),
            "-NonInteractive".to_string(),
            "-ExecutionPolicy".to_string(),
            "Bypass".to_string(),
            "-File".to_string(),
            SELF_BUILD_SCRIPT.to_string(),
            "-Action".to_string(),
            action.to_string(),
        ],
        ProcessOptions::default(),
    )
}

/// `install`/`update` must come from a single function, not the generic
/// `assemble` shape the dispatcher uses for most tools, because `update`
/// may chain a conditional restart after it (§9 decision 5: only on a
/// verified-successful update, never after a failed one).
pub fn assemble(args: &Value, config: &ServerConfig) -> Result<BuildCommand, ToolError> {
    let action = require_str(args, "action")?;

    match action {
        "install" | "update" if !config.modes.dangerous => Err(ToolError::Validation(ValidationError::Command {
            reason: format!("action '{action}' requires ENABLE_DANGEROUS_MODE"),
        })),
        "build" | "test" | "install" | "start" | "stop" | "status" => Ok(script_command(action)),
        "update" => {
            let mut build = script_command(action);
            build.options.timeout = Some(UPDATE_TIMEOUT.min(config.max_allowed_timeout));
            Ok(build)
        }
        other => Err(ToolError::WrongType(format!(
            "action '{other}' is not one of build|test|install|update|start|stop|status"
        ))),
    }
}

/// `update` with `autoStart: true` chains a `start` call, but only once the
/// update itself reports success.
pub async fn run(args: &Value, config: &ServerConfig) -> Result<ExecutionResult, ToolError> {
    let build = assemble(args, config)?;
    let action = require_str(args, "action")?;
    let auto_start = args.get("autoStart").and_then(Value::as_bool).unwrap_or(false);

    let result = dispatch::execute(build, config).await;

    if action == "update" && auto_start && result.success {
        let start = script_command("start");
        return Ok(dispatch::execute(start, config).await);
    }

    Ok(result)
}
