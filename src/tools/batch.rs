//! `run_batch` (§4.6 argv shape "Batch execution").

use std::path::Path;

use serde_json::Value;

use crate::config::ServerConfig;
use crate::dispatch::BuildCommand;
use crate::process::ProcessOptions;
use crate::security::path::{validate_batch_file_path, validate_path};
use crate::tools::{optional_str, require_str, ToolError};

pub fn assemble(args: &Value, config: &ServerConfig) -> Result<BuildCommand, ToolError> {
    let batch_file = require_str(args, "batchFile")?;
    let validated = validate_batch_file_path(batch_file, &config.allowed_batch_dirs)?;

    let working_directory = match optional_str(args, "workingDirectory") {
        Some(dir) => validate_path(dir, &config.allowed_batch_dirs)?,
        None => Path::new(&validated)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| validated.clone()),
    };

    Ok(BuildCommand::local(
        "cmd.exe",
        vec![
            "/c".to_string(),
            format!("cd /d \"{working_directory}\" && \"{validated}\""),
        ],
        ProcessOptions::default(),
    ))
}
