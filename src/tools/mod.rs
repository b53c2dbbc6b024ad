//! Static tool descriptor table and the per-tool argument-assembly
//! contracts consumed by the dispatcher (§4.6).
//!
//! Each submodule is a thin argv assembler: it validates its own arguments
//! against the security validator and returns a [`BuildCommand`] (or, for
//! `ssh_command`, a ready-made [`crate::result::ExecutionResult`]). None of
//! them spawn a process themselves -- that stays centralized in
//! `dispatch::execute`.

pub mod batch;
pub mod builds;
pub mod dotnet;
pub mod file_sync;
pub mod ping_host;
pub mod powershell;
pub mod process_manager;
pub mod self_build;
pub mod ssh_command;

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::Value;

use crate::security::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("Argument '{0}' has the wrong type")]
    WrongType(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl ToolError {
    /// Every dispatcher-visible failure is rendered as MCP text, never a
    /// JSON-RPC error (§9 decision 3) -- `UnknownTool` included, per §4.6.
    pub fn to_mcp_text(&self) -> String {
        match self {
            ToolError::Validation(e) => e.to_mcp_text(),
            ToolError::UnknownTool(name) => format!("Unknown tool: {name}"),
            other => format!("Validation error: {other} (check the tool's required arguments)"),
        }
    }
}

pub fn require_str<'a>(args: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    args.get(field)
        .ok_or_else(|| ToolError::MissingArgument(field.to_string()))?
        .as_str()
        .ok_or_else(|| ToolError::WrongType(field.to_string()))
}

pub fn optional_str<'a>(args: &'a Value, field: &str) -> Option<&'a str> {
    args.get(field).and_then(Value::as_str)
}

pub fn optional_u64(args: &Value, field: &str) -> Option<u64> {
    args.get(field).and_then(Value::as_u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    RunPowershell,
    BuildDotnet,
    PingHost,
    SshCommand,
    RunBatch,
    McpSelfBuild,
    ProcessManager,
    FileSync,
    BuildGo,
    BuildRust,
    BuildCpp,
    BuildJava,
    BuildPython,
    BuildNode,
    BuildDocker,
    BuildKotlin,
    BuildSwift,
    BuildPhp,
    BuildRuby,
}

impl ToolName {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::RunPowershell => "run_powershell",
            ToolName::BuildDotnet => "build_dotnet",
            ToolName::PingHost => "ping_host",
            ToolName::SshCommand => "ssh_command",
            ToolName::RunBatch => "run_batch",
            ToolName::McpSelfBuild => "mcp_self_build",
            ToolName::ProcessManager => "process_manager",
            ToolName::FileSync => "file_sync",
            ToolName::BuildGo => "build_go",
            ToolName::BuildRust => "build_rust",
            ToolName::BuildCpp => "build_cpp",
            ToolName::BuildJava => "build_java",
            ToolName::BuildPython => "build_python",
            ToolName::BuildNode => "build_node",
            ToolName::BuildDocker => "build_docker",
            ToolName::BuildKotlin => "build_kotlin",
            ToolName::BuildSwift => "build_swift",
            ToolName::BuildPhp => "build_php",
            ToolName::BuildRuby => "build_ruby",
        }
    }

    pub fn from_str(name: &str) -> Option<Self> {
        ALL.iter().copied().find(|t| t.as_str() == name)
    }
}

pub const ALL: &[ToolName] = &[
    ToolName::RunPowershell,
    ToolName::BuildDotnet,
    ToolName::PingHost,
    ToolName::SshCommand,
    ToolName::RunBatch,
    ToolName::McpSelfBuild,
    ToolName::ProcessManager,
    ToolName::FileSync,
    ToolName::BuildGo,
    ToolName::BuildRust,
    ToolName::BuildCpp,
    ToolName::BuildJava,
    ToolName::BuildPython,
    ToolName::BuildNode,
    ToolName::BuildDocker,
    ToolName::BuildKotlin,
    ToolName::BuildSwift,
    ToolName::BuildPhp,
    ToolName::BuildRuby,
];

#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(JsonSchema, Deserialize)]
struct RunPowershellArgs {
    command: String,
    #[serde(rename = "remoteHost")]
    remote_host: Option<String>,
    timeout: Option<u64>,
}

#[derive(JsonSchema, Deserialize)]
struct BuildDotnetArgs {
    #[serde(rename = "projectPath")]
    project_path: String,
    configuration: Option<String>,
    #[serde(rename = "remoteHost")]
    remote_host: Option<String>,
}

#[derive(JsonSchema, Deserialize)]
struct PingHostArgs {
    host: String,
}

#[derive(JsonSchema, Deserialize)]
struct SshCommandArgs {
    host: String,
    username: String,
    password: String,
    command: String,
}

#[derive(JsonSchema, Deserialize)]
struct RunBatchArgs {
    #[serde(rename = "batchFile")]
    batch_file: String,
    #[serde(rename = "workingDirectory")]
    working_directory: Option<String>,
}

#[derive(JsonSchema, Deserialize)]
struct McpSelfBuildArgs {
    action: String,
    #[serde(rename = "autoStart")]
    auto_start: Option<bool>,
}

#[derive(JsonSchema, Deserialize)]
struct ProcessManagerArgs {
    action: String,
    target: Option<String>,
    #[serde(rename = "asService")]
    as_service: Option<bool>,
}

#[derive(JsonSchema, Deserialize)]
struct FileSyncArgs {
    source: String,
    destination: String,
    mirror: Option<bool>,
}

#[derive(JsonSchema, Deserialize)]
struct GenericBuildArgs {
    #[serde(rename = "projectPath")]
    project_path: String,
    #[serde(rename = "remoteHost")]
    remote_host: Option<String>,
}

fn schema_of<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).expect("schemars output is always valid JSON")
}

/// `tools/list` (§4.1 Stage H, §6): the static descriptor table.
pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: ToolName::RunPowershell.as_str(),
            description: "Run a PowerShell command on the host, or on a remote host over SSH.",
            input_schema: schema_of::<RunPowershellArgs>(),
        },
        ToolDescriptor {
            name: ToolName::BuildDotnet.as_str(),
            description: "Build a .NET project and copy its output into the release tree.",
            input_schema: schema_of::<BuildDotnetArgs>(),
        },
        ToolDescriptor {
            name: ToolName::PingHost.as_str(),
            description: "Check host reachability with ICMP ping.",
            input_schema: schema_of::<PingHostArgs>(),
        },
        ToolDescriptor {
            name: ToolName::SshCommand.as_str(),
            description: "Run a single command on a remote host over SSH with password auth.",
            input_schema: schema_of::<SshCommandArgs>(),
        },
        ToolDescriptor {
            name: ToolName::RunBatch.as_str(),
            description: "Run a Windows batch (.bat/.cmd) file under an allowed directory.",
            input_schema: schema_of::<RunBatchArgs>(),
        },
        ToolDescriptor {
            name: ToolName::McpSelfBuild.as_str(),
            description: "Manage this daemon's own build/install/update lifecycle.",
            input_schema: schema_of::<McpSelfBuildArgs>(),
        },
        ToolDescriptor {
            name: ToolName::ProcessManager.as_str(),
            description: "Start, stop, restart, list, or kill a named Windows process or service.",
            input_schema: schema_of::<ProcessManagerArgs>(),
        },
        ToolDescriptor {
            name: ToolName::FileSync.as_str(),
            description: "Mirror a directory tree to another location with robocopy.",
            input_schema: schema_of::<FileSyncArgs>(),
        },
        ToolDescriptor {
            name: ToolName::BuildGo.as_str(),
            description: "Build a Go module, auto-detected from go.mod.",
            input_schema: schema_of::<GenericBuildArgs>(),
        },
        ToolDescriptor {
            name: ToolName::BuildRust.as_str(),
            description: "Build a Rust crate, auto-detected from Cargo.toml.",
            input_schema: schema_of::<GenericBuildArgs>(),
        },
        ToolDescriptor {
            name: ToolName::BuildCpp.as_str(),
            description: "Build a C++ project via CMake or MSBuild.",
            input_schema: schema_of::<GenericBuildArgs>(),
        },
        ToolDescriptor {
            name: ToolName::BuildJava.as_str(),
            description: "Build a Java project, auto-detected from pom.xml or gradlew(.bat).",
            input_schema: schema_of::<GenericBuildArgs>(),
        },
        ToolDescriptor {
            name: ToolName::BuildPython.as_str(),
            description: "Build/install a Python project, auto-detected from pyproject.toml or Pipfile.",
            input_schema: schema_of::<GenericBuildArgs>(),
        },
        ToolDescriptor {
            name: ToolName::BuildNode.as_str(),
            description: "Build a Node project, auto-detected from package.json and its lockfile.",
            input_schema: schema_of::<GenericBuildArgs>(),
        },
        ToolDescriptor {
            name: ToolName::BuildDocker.as_str(),
            description: "Build a Docker image from a project directory.",
            input_schema: schema_of::<GenericBuildArgs>(),
        },
        ToolDescriptor {
            name: ToolName::BuildKotlin.as_str(),
            description: "Build a Kotlin project via gradlew(.bat).",
            input_schema: schema_of::<GenericBuildArgs>(),
        },
        ToolDescriptor {
            name: ToolName::BuildSwift.as_str(),
            description: "Build a Swift package.",
            input_schema: schema_of::<GenericBuildArgs>(),
        },
        ToolDescriptor {
            name: ToolName::BuildPhp.as_str(),
            description: "Install a PHP project's dependencies via composer.",
            input_schema: schema_of::<GenericBuildArgs>(),
        },
        ToolDescriptor {
            name: ToolName::BuildRuby.as_str(),
            description: "Install a Ruby project's dependencies via bundler.",
            input_schema: schema_of::<GenericBuildArgs>(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tool_name_round_trips_through_from_str() {
        for tool in ALL {
            assert_eq!(ToolName::from_str(tool.as_str()), Some(*tool));
        }
    }

    #[test]
    fn descriptor_table_covers_every_tool_name() {
        let names: Vec<&str> = descriptors().iter().map(|d| d.name).collect();
        for tool in ALL {
            assert!(names.contains(&tool.as_str()));
        }
    }

    #[test]
    fn unknown_tool_name_is_not_resolved() {
        assert!(ToolName::from_str("drop_table").is_none());
    }
}
