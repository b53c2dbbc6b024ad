//! Tool dispatcher (§4.6): a single entry point that validates arguments,
//! consults the security validator, chooses local vs. SSH execution, and
//! shapes the result into an MCP content envelope.

use serde_json::{json, Value};

use crate::config::ServerConfig;
use crate::crypto::CredentialCodec;
use crate::process::{self, ProcessOptions};
use crate::result::ExecutionResult;
use crate::ssh;
use crate::tools::{self, ToolError, ToolName};

/// What a tool handler hands back when it just wants "run this argv" --
/// the dispatcher decides local vs. SSH execution uniformly from here.
/// Handlers with their own execution story (`build_dotnet`'s copy-then-build
/// sequence, `file_sync`'s robocopy exit-code remap, `ssh_command`'s direct
/// SSH call) bypass this and return a finished [`ExecutionResult`] instead.
pub struct BuildCommand {
    pub command: String,
    pub args: Vec<String>,
    pub options: ProcessOptions,
    pub remote_host: Option<String>,
}

impl BuildCommand {
    pub fn local(command: impl Into<String>, args: Vec<String>, options: ProcessOptions) -> Self {
        Self {
            command: command.into(),
            args,
            options,
            remote_host: None,
        }
    }

    pub fn with_remote_host(mut self, remote_host: Option<String>) -> Self {
        self.remote_host = remote_host;
        self
    }
}

/// Join an argv vector into a single command line for SSH execution, quoting
/// any argument containing whitespace. Local execution never does this --
/// it only exists because the SSH channel takes one command string (§4.5).
fn quote_argv(command: &str, args: &[String]) -> String {
    let mut parts = vec![quote_one(command)];
    parts.extend(args.iter().map(|a| quote_one(a)));
    parts.join(" ")
}

fn quote_one(token: &str) -> String {
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        format!("\"{}\"", token.replace('"', "\\\""))
    } else {
        token.to_string()
    }
}

/// Run a [`BuildCommand`] to completion, routing through SSH when
/// `remote_host` is set (§4.4 step 1) and otherwise through the local
/// process executor, with the `dotnet*`-aware default timeout applied.
pub async fn execute(build: BuildCommand, config: &ServerConfig) -> ExecutionResult {
    if let Some(host) = build.remote_host {
        let command_line = quote_argv(&build.command, &build.args);
        let codec = CredentialCodec::from_env_or_generate();
        return ssh::execute_remote_command(
            &host,
            &command_line,
            &config.remote_username,
            config.remote_password.as_deref(),
            &codec,
            config.ssh_timeout,
        )
        .await;
    }

    let default_timeout = process::default_timeout_for(&build.command, config.command_timeout);
    let mut options = build.options;
    options.timeout = Some(options.timeout.unwrap_or(default_timeout).min(config.max_allowed_timeout));
    process::run_argv(&build.command, &build.args, &options, config.max_allowed_timeout).await
}

/// `handleToolsCall({name, arguments})` (§4.6). Returns the MCP
/// `result.content` payload; callers wrap it as `{jsonrpc, id, result}`.
pub async fn handle_tools_call(name: &str, arguments: &Value, config: &ServerConfig) -> Value {
    let empty = json!({});
    let args = if arguments.is_null() { &empty } else { arguments };

    let result = match run_tool(name, args, config).await {
        Ok(result) => result,
        Err(e) => {
            return json!({ "content": [{ "type": "text", "text": e.to_mcp_text() }] });
        }
    };

    json!({ "content": result.content })
}

async fn run_tool(name: &str, args: &Value, config: &ServerConfig) -> Result<ExecutionResult, ToolError> {
    use tools::*;

    let Some(tool) = ToolName::from_str(name) else {
        return Err(ToolError::UnknownTool(name.to_string()));
    };

    match tool {
        ToolName::RunPowershell => Ok(execute(powershell::assemble(args, config)?, config).await),
        ToolName::BuildDotnet => dotnet::run(args, config).await,
        ToolName::PingHost => Ok(execute(ping_host::assemble(args)?, config).await),
        ToolName::RunBatch => Ok(execute(batch::assemble(args, config)?, config).await),
        ToolName::McpSelfBuild => self_build::run(args, config).await,
        ToolName::ProcessManager => Ok(execute(process_manager::assemble(args)?, config).await),
        ToolName::FileSync => file_sync::run(args, config).await,
        ToolName::SshCommand => ssh_command::execute(args, config).await,
        ToolName::BuildGo
        | ToolName::BuildRust
        | ToolName::BuildCpp
        | ToolName::BuildJava
        | ToolName::BuildPython
        | ToolName::BuildNode
        | ToolName::BuildDocker
        | ToolName::BuildKotlin
        | ToolName::BuildSwift
        | ToolName::BuildPhp
        | ToolName::BuildRuby => Ok(execute(builds::assemble(tool, args, config).await?, config).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_argv_wraps_whitespace_but_not_plain_tokens() {
        let line = quote_argv("powershell.exe", &["-NoProfile".to_string(), "Get Date".to_string()]);
        assert_eq!(line, "powershell.exe -NoProfile \"Get Date\"");
    }

    #[tokio::test]
    async fn unknown_tool_becomes_mcp_text_not_a_json_rpc_error() {
        let config = std::sync::Arc::new(test_config());
        let result = handle_tools_call("does_not_exist", &json!({}), &config).await;
        let text = result["content"][0]["text"].as_str().unwrap();
        assert_eq!(text, "Unknown tool: does_not_exist");
    }

    fn test_config() -> ServerConfig {
        ServerConfig {
            auth_token: None,
            allowed_ips: vec![],
            allowed_origins: vec![],
            rate_limit: crate::config::RateLimitConfig {
                max_requests: 100,
                window: std::time::Duration::from_secs(60),
            },
            command_timeout: std::time::Duration::from_secs(300),
            max_allowed_timeout: std::time::Duration::from_secs(1800),
            ssh_timeout: std::time::Duration::from_secs(30),
            allowed_build_paths: vec![],
            allowed_batch_dirs: vec![],
            dev_command_paths: vec![],
            allowed_dev_commands: vec![],
            allowed_file_encoding_extensions: vec![],
            max_encoding_bytes: 10_485_760,
            remote_username: "Administrator".to_string(),
            remote_password: None,
            known_remote_hosts: vec![],
            modes: crate::config::ModesConfig {
                dangerous: false,
                dev_commands: false,
            },
            max_command_length: 8192,
            preferred_port: crate::config::PortPreference::Auto,
            server_version: "test".to_string(),
            server_name: "mcp-exec-daemon".to_string(),
        }
    }
}
