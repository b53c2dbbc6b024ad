//! `build_dotnet` (§4.6 argv shape ".NET build", scenario §8.8): the one
//! build wrapper kept in-core because the spec pins its exact side-effect
//! sequence rather than leaving it to an out-of-core argv assembler.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::ServerConfig;
use crate::dispatch::{self, BuildCommand};
use crate::process::ProcessOptions;
use crate::result::ExecutionResult;
use crate::security::ip;
use crate::security::path::validate_build_path;
use crate::tools::{optional_str, require_str, ToolError};

/// Recursively copy `src` into `dst`, preserving relative structure. Runs
/// on a blocking thread -- `walkdir` and `std::fs` are both synchronous.
fn copy_tree(src: PathBuf, dst: PathBuf) -> std::io::Result<()> {
    for entry in walkdir::WalkDir::new(&src) {
        let entry = entry.map_err(std::io::Error::other)?;
        let relative = entry.path().strip_prefix(&src).expect("walkdir yields paths under src");
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

pub async fn run(args: &Value, config: &ServerConfig) -> Result<ExecutionResult, ToolError> {
    let project_path = require_str(args, "projectPath")?;
    let configuration = optional_str(args, "configuration").unwrap_or("Release").to_string();
    let remote_host = match optional_str(args, "remoteHost") {
        Some(host) => {
            ip::validate_ip_address(host, false)?;
            Some(host.to_string())
        }
        None => None,
    };

    let validated_csproj = validate_build_path(project_path, &config.allowed_build_paths)?;
    let csproj = Path::new(&validated_csproj);
    let project_name = csproj
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    let source_dir = csproj
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let build_root = PathBuf::from(format!("C:\\build\\{project_name}"));
    let release_dir = build_root.join("release");

    if remote_host.is_none() {
        let release_dir_for_blocking = release_dir.clone();
        tokio::task::spawn_blocking(move || std::fs::create_dir_all(&release_dir_for_blocking))
            .await
            .map_err(|e| ToolError::WrongType(e.to_string()))?
            .map_err(|e| ToolError::WrongType(format!("failed to create release directory: {e}")))?;

        let build_root_for_copy = build_root.clone();
        let source_dir_for_copy = source_dir.clone();
        tokio::task::spawn_blocking(move || copy_tree(source_dir_for_copy, build_root_for_copy))
            .await
            .map_err(|e| ToolError::WrongType(e.to_string()))?
            .map_err(|e| ToolError::WrongType(format!("failed to copy source tree: {e}")))?;
    }

    let build = BuildCommand::local(
        "dotnet.exe",
        vec![
            "build".to_string(),
            validated_csproj.clone(),
            "-c".to_string(),
            configuration,
            "-o".to_string(),
            release_dir.to_string_lossy().into_owned(),
        ],
        ProcessOptions::default(),
    )
    .with_remote_host(remote_host);

    let mut result = dispatch::execute(build, config).await;

    let trailer = format!(
        "\n\nCreated directories:\n{}\n{}",
        build_root.display(),
        release_dir.display()
    );
    if let Some(first) = result.content.first_mut() {
        first.text.push_str(&trailer);
    }
    result.output.push_str(&trailer);

    Ok(result)
}
