//! Remote build-and-execution daemon: MCP over JSON-RPC over HTTP.
//!
//! This crate exposes a privileged execution surface for an AI coding
//! assistant running on another machine: shell/PowerShell commands, build
//! tool invocations, process management, file sync, and SSH fan-out to
//! third-party hosts. It is not a sandbox -- the security layer narrows the
//! blast radius of argv-based execution, it does not replace OS isolation.

pub mod config;
pub mod crypto;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod logging;
pub mod port;
pub mod process;
pub mod rate_limit;
pub mod result;
pub mod rpc;
pub mod security;
pub mod ssh;
pub mod tools;
