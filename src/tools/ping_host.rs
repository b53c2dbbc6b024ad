//! `ping_host` (§6 tool table): reachability check via the Windows ICMP
//! helper.

use serde_json::Value;

use crate::dispatch::BuildCommand;
use crate::process::ProcessOptions;
use crate::security::ip::validate_ip_address;
use crate::tools::{require_str, ToolError};

pub fn assemble(args: &Value) -> Result<BuildCommand, ToolError> {
    let host = require_str(args, "host")?;
    let addr = validate_ip_address(host, false)?;

    Ok(BuildCommand::local(
        "ping.exe",
        vec!["-n".to_string(), "4".to_string(), addr.to_string()],
        ProcessOptions::default(),
    ))
}
