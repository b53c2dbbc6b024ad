//! `file_sync` (§4.6 argv shape "File sync"): robocopy with its
//! inverted exit-code convention (0-7 success, >=8 failure).

use serde_json::Value;

use crate::config::ServerConfig;
use crate::process::{self, ProcessOptions};
use crate::result::ExecutionResult;
use crate::security::path::validate_build_path;
use crate::tools::{require_str, ToolError};

pub async fn run(args: &Value, config: &ServerConfig) -> Result<ExecutionResult, ToolError> {
    let source = require_str(args, "source")?;
    let destination = require_str(args, "destination")?;
    let mirror = args.get("mirror").and_then(Value::as_bool).unwrap_or(false);

    let validated_source = validate_build_path(source, &config.allowed_build_paths)?;
    let validated_destination = validate_build_path(destination, &config.allowed_build_paths)?;

    let mut argv = vec![validated_source, validated_destination];
    if mirror {
        argv.push("/MIR".to_string());
    } else {
        argv.push("/E".to_string());
    }
    argv.push("/R:2".to_string());
    argv.push("/W:2".to_string());

    let mut options = ProcessOptions::default();
    options.ignore_exit_code = true;

    let timeout = process::default_timeout_for("robocopy.exe", config.command_timeout);
    options.timeout = Some(timeout.min(config.max_allowed_timeout));

    let raw = process::run_argv("robocopy.exe", &argv, &options, config.max_allowed_timeout).await;
    Ok(reinterpret_robocopy_exit(raw))
}

/// Robocopy's exit code is a bitmask where 0-7 all indicate some form of
/// success (no changes through "files copied, no failures"); 8 and above
/// indicate a real failure. Remap onto the uniform `success` field.
fn reinterpret_robocopy_exit(mut result: ExecutionResult) -> ExecutionResult {
    if let Some(code) = result.exit_code {
        result.success = (0..8).contains(&code);
        if !result.success {
            if let Some(first) = result.content.first_mut() {
                first.text = format!("Process failed with code {code}:\n{}", first.text);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::TextContent;

    fn result_with_code(code: i32) -> ExecutionResult {
        ExecutionResult {
            success: false,
            output: "ok".to_string(),
            error: String::new(),
            exit_code: Some(code),
            signal: None,
            content: vec![TextContent { kind: "text", text: "ok".to_string() }],
        }
    }

    #[test]
    fn codes_zero_through_seven_are_success() {
        for code in 0..8 {
            assert!(reinterpret_robocopy_exit(result_with_code(code)).success);
        }
    }

    #[test]
    fn code_eight_and_above_is_failure() {
        assert!(!reinterpret_robocopy_exit(result_with_code(8)).success);
        assert!(!reinterpret_robocopy_exit(result_with_code(16)).success);
    }
}
