//! Language build wrappers (§4.6 "Language build wrappers"): thin,
//! auto-detecting argv assemblers. Detection only reads files in the
//! project directory -- it never executes anything (§4.6 contract).

use serde_json::Value;

use crate::config::ServerConfig;
use crate::dispatch::BuildCommand;
use crate::process::ProcessOptions;
use crate::security::ip;
use crate::security::path::validate_build_path;
use crate::tools::{optional_str, require_str, ToolError, ToolName};

async fn exists(dir: &str, file: &str) -> bool {
    tokio::fs::try_exists(format!("{dir}\\{file}")).await.unwrap_or(false)
}

pub async fn assemble(tool: ToolName, args: &Value, config: &ServerConfig) -> Result<BuildCommand, ToolError> {
    let project_path = require_str(args, "projectPath")?;
    let validated = validate_build_path(project_path, &config.allowed_build_paths)?;

    let remote_host = match optional_str(args, "remoteHost") {
        Some(host) => {
            ip::validate_ip_address(host, false)?;
            Some(host.to_string())
        }
        None => None,
    };

    let (command, cmd_args) = detect_toolchain(tool, &validated).await?;

    let mut options = ProcessOptions::default();
    options.working_directory = Some(validated);

    Ok(BuildCommand::local(command, cmd_args, options).with_remote_host(remote_host))
}

async fn detect_toolchain(tool: ToolName, dir: &str) -> Result<(String, Vec<String>), ToolError> {
    match tool {
        ToolName::BuildGo => {
            if !exists(dir, "go.mod").await {
                return Err(not_detected("go.mod"));
            }
            Ok(("go.exe".to_string(), vec!["build".to_string(), "./...".to_string()]))
        }
        ToolName::BuildRust => {
            if !exists(dir, "Cargo.toml").await {
                return Err(not_detected("Cargo.toml"));
            }
            Ok(("cargo.exe".to_string(), vec!["build".to_string(), "--release".to_string()]))
        }
        ToolName::BuildCpp => {
            if exists(dir, "CMakeLists.txt").await {
                Ok(("cmake.exe".to_string(), vec!["--build".to_string(), ".".to_string()]))
            } else {
                Err(not_detected("CMakeLists.txt"))
            }
        }
        ToolName::BuildJava => {
            if exists(dir, "pom.xml").await {
                Ok(("mvn.cmd".to_string(), vec!["-f".to_string(), "pom.xml".to_string(), "package".to_string()]))
            } else if exists(dir, "gradlew.bat").await {
                Ok(("gradlew.bat".to_string(), vec!["build".to_string()]))
            } else {
                Err(not_detected("pom.xml or gradlew.bat"))
            }
        }
        ToolName::BuildPython => {
            if exists(dir, "pyproject.toml").await {
                Ok(("pip.exe".to_string(), vec!["install".to_string(), ".".to_string()]))
            } else if exists(dir, "Pipfile").await {
                Ok(("pipenv.exe".to_string(), vec!["install".to_string()]))
            } else if exists(dir, "environment.yml").await {
                Ok((
                    "conda.exe".to_string(),
                    vec!["env".to_string(), "update".to_string(), "-f".to_string(), "environment.yml".to_string()],
                ))
            } else {
                Err(not_detected("pyproject.toml, Pipfile, or environment.yml"))
            }
        }
        ToolName::BuildNode => {
            if !exists(dir, "package.json").await {
                return Err(not_detected("package.json"));
            }
            if exists(dir, "yarn.lock").await {
                Ok(("yarn.cmd".to_string(), vec!["install".to_string()]))
            } else if exists(dir, "pnpm-lock.yaml").await {
                Ok(("pnpm.cmd".to_string(), vec!["install".to_string()]))
            } else {
                Ok(("npm.cmd".to_string(), vec!["install".to_string()]))
            }
        }
        ToolName::BuildDocker => {
            if !exists(dir, "Dockerfile").await {
                return Err(not_detected("Dockerfile"));
            }
            let tag = dir.rsplit('\\').next().unwrap_or("image").to_ascii_lowercase();
            Ok(("docker.exe".to_string(), vec!["build".to_string(), "-t".to_string(), tag, ".".to_string()]))
        }
        ToolName::BuildKotlin => {
            if !exists(dir, "gradlew.bat").await {
                return Err(not_detected("gradlew.bat"));
            }
            Ok(("gradlew.bat".to_string(), vec!["build".to_string()]))
        }
        ToolName::BuildSwift => {
            if !exists(dir, "Package.swift").await {
                return Err(not_detected("Package.swift"));
            }
            Ok(("swift.exe".to_string(), vec!["build".to_string()]))
        }
        ToolName::BuildPhp => {
            if !exists(dir, "composer.json").await {
                return Err(not_detected("composer.json"));
            }
            Ok(("composer.bat".to_string(), vec!["install".to_string()]))
        }
        ToolName::BuildRuby => {
            if !exists(dir, "Gemfile").await {
                return Err(not_detected("Gemfile"));
            }
            Ok(("bundle.bat".to_string(), vec!["install".to_string()]))
        }
        other => unreachable!("{other:?} is not a language build wrapper"),
    }
}

fn not_detected(expected: &str) -> ToolError {
    ToolError::WrongType(format!("could not detect a toolchain: expected to find {expected} in the project directory"))
}
