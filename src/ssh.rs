//! SSH executor (§4.5): one-shot remote command execution over SSH with
//! password authentication.
//!
//! `russh` is used in client mode with a `Handler` that accepts the server
//! host key unconditionally -- the daemon already trusts `knownRemoteHosts`
//! at the configuration layer (§3), and host-key pinning is out of scope
//! for this spec.

use std::sync::Arc;
use std::time::Duration;

use russh::client::{self, Handle};
use russh::ChannelMsg;

use crate::crypto::{hash_for_logging, CredentialCodec, ENCRYPTED_PREFIX};
use crate::logging::log_ssh_attempt;
use crate::result::ExecutionResult;

struct AcceptAllHostKeys;

impl client::Handler for AcceptAllHostKeys {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh::keys::ssh_key::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// `executeSSHCommand(host, username, password, command)` (§4.5 steps 1-5).
pub async fn execute_ssh_command(
    host: &str,
    username: &str,
    password: &str,
    command: &str,
    ssh_timeout: Duration,
) -> ExecutionResult {
    log_ssh_attempt(host, password);

    let config = Arc::new(client::Config {
        inactivity_timeout: Some(ssh_timeout),
        ..Default::default()
    });

    let connect = client::connect(config, (host, 22), AcceptAllHostKeys);
    let mut session: Handle<AcceptAllHostKeys> =
        match tokio::time::timeout(ssh_timeout, connect).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => return ExecutionResult::spawn_error(format!("Connection failed to {host}: {e}")),
            Err(_) => return ExecutionResult::spawn_error(format!("SSH connection timeout to {host}")),
        };

    match session.authenticate_password(username, password).await {
        Ok(result) if result.success() => {}
        Ok(_) => {
            return ExecutionResult::spawn_error(format!(
                "Connection failed to {host}: authentication rejected (password hash {})",
                hash_for_logging(password)
            ));
        }
        Err(e) => {
            return ExecutionResult::spawn_error(format!("Connection failed to {host}: {e}"));
        }
    }

    let mut channel = match session.channel_open_session().await {
        Ok(channel) => channel,
        Err(e) => {
            let _ = session.disconnect(russh::Disconnect::ByApplication, "", "").await;
            return ExecutionResult::spawn_error(format!("Connection failed to {host}: {e}"));
        }
    };

    if let Err(e) = channel.exec(true, command).await {
        let _ = session.disconnect(russh::Disconnect::ByApplication, "", "").await;
        return ExecutionResult::spawn_error(format!("Connection failed to {host}: {e}"));
    }

    let mut buffer = String::new();
    let mut exit_status: Option<u32> = None;

    while let Some(msg) = channel.wait().await {
        match msg {
            ChannelMsg::Data { data } => {
                buffer.push_str(&String::from_utf8_lossy(&data));
            }
            ChannelMsg::ExtendedData { data, .. } => {
                for line in String::from_utf8_lossy(&data).lines() {
                    buffer.push_str("STDERR: ");
                    buffer.push_str(line);
                    buffer.push('\n');
                }
            }
            ChannelMsg::ExitStatus { exit_status: code } => {
                exit_status = Some(code);
            }
            ChannelMsg::Eof | ChannelMsg::Close => break,
            _ => {}
        }
    }

    let _ = session.disconnect(russh::Disconnect::ByApplication, "", "").await;

    let code = exit_status.unwrap_or(0) as i32;
    let text = format!("SSH Command completed (code: {code}):\n{buffer}");
    ExecutionResult {
        success: code == 0,
        output: buffer.clone(),
        error: String::new(),
        exit_code: Some(code),
        signal: None,
        content: vec![crate::result::TextContent {
            kind: "text",
            text,
        }],
    }
}

/// `executeRemoteCommand(host, command)` (§4.5): reads
/// `REMOTE_USERNAME`/`REMOTE_PASSWORD` from configuration. `REMOTE_PASSWORD`
/// may be stored as plaintext or as an `"encrypted:"`-prefixed ciphertext --
/// only the latter is run through [`CredentialCodec::decrypt`].
pub async fn execute_remote_command(
    host: &str,
    command: &str,
    remote_username: &str,
    remote_password: Option<&str>,
    codec: &CredentialCodec,
    ssh_timeout: Duration,
) -> ExecutionResult {
    let password = match remote_password {
        Some(value) if value.starts_with(ENCRYPTED_PREFIX) => match codec.decrypt(value) {
            Ok(plaintext) => plaintext,
            Err(_) => return ExecutionResult::spawn_error("Failed to decrypt remote password"),
        },
        Some(plaintext) => plaintext.to_string(),
        None => return ExecutionResult::spawn_error("REMOTE_PASSWORD is not configured"),
    };

    execute_ssh_command(host, remote_username, &password, command, ssh_timeout).await
}
