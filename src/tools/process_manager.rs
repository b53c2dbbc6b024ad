//! `process_manager` (§4.6 argv shape "Process manager"): dispatches onto
//! `net.exe` for services and `taskkill.exe`/`tasklist.exe`/`sc.exe` for bare
//! processes.

use serde_json::Value;

use crate::dispatch::BuildCommand;
use crate::process::ProcessOptions;
use crate::tools::{optional_str, require_str, ToolError};

fn target_or_missing<'a>(args: &'a Value) -> Result<&'a str, ToolError> {
    optional_str(args, "target").ok_or_else(|| ToolError::MissingArgument("target".to_string()))
}

pub fn assemble(args: &Value) -> Result<BuildCommand, ToolError> {
    let action = require_str(args, "action")?;
    let as_service = args.get("asService").and_then(Value::as_bool).unwrap_or(false);

    let (command, cmd_args) = match (action, as_service) {
        ("list", _) => ("tasklist.exe".to_string(), vec![]),
        ("status", true) => ("sc.exe".to_string(), vec!["query".to_string(), target_or_missing(args)?.to_string()]),
        ("status", false) => (
            "tasklist.exe".to_string(),
            vec!["/FI".to_string(), format!("IMAGENAME eq {}", target_or_missing(args)?)],
        ),
        ("start", true) => ("net.exe".to_string(), vec!["start".to_string(), target_or_missing(args)?.to_string()]),
        ("stop", true) => ("net.exe".to_string(), vec!["stop".to_string(), target_or_missing(args)?.to_string()]),
        ("restart", true) => {
            let target = target_or_missing(args)?;
            (
                "cmd.exe".to_string(),
                vec!["/c".to_string(), format!("net stop {target} && net start {target}")],
            )
        }
        ("stop", false) | ("kill", false) => (
            "taskkill.exe".to_string(),
            vec!["/F".to_string(), "/IM".to_string(), target_or_missing(args)?.to_string()],
        ),
        ("start", false) => (
            "cmd.exe".to_string(),
            vec!["/c".to_string(), "start".to_string(), "".to_string(), target_or_missing(args)?.to_string()],
        ),
        ("restart", false) => {
            let target = target_or_missing(args)?;
            (
                "cmd.exe".to_string(),
                vec!["/c".to_string(), format!("taskkill /F /IM {target} & start \"\" {target}")],
            )
        }
        (other, _) => {
            return Err(ToolError::WrongType(format!(
                "action '{other}' is not one of start|stop|restart|status|list|kill"
            )))
        }
    };

    Ok(BuildCommand::local(command, cmd_args, ProcessOptions::default()))
}
