//! HTTP front door (§4.1): the ordered pipeline every `/mcp` request
//! traverses, plus `/health` and the out-of-core `/help/*` stub.
//!
//! Grounded in the axum JSON-RPC handler pattern from the wider retrieval
//! pack (a hand-rolled stage sequence inside one handler, rather than a
//! tower middleware stack) because several stages need to attach data to
//! later stages (the rate-limit remaining count onto the final response,
//! the parsed method name onto the access log) that doesn't fit cleanly
//! into independent `tower::Layer`s.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use subtle::ConstantTimeEq;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::dispatch;
use crate::error::AppError;
use crate::logging::{self, AccessLogRecord};
use crate::rate_limit::RateLimiterStore;
use crate::rpc::{self, JsonRpcId, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION};
use crate::security::ip;
use crate::tools;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub rate_limiter: RateLimiterStore,
}

pub fn router(state: AppState) -> Router {
    let cors = if state.config.allowed_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = state
            .config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    Router::new()
        .route("/health", get(health))
        .route("/mcp", post(mcp))
        .route("/help/{*path}", get(help))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "server": state.config.server_name,
        "version": state.config.server_version,
        "remoteHosts": state.config.known_remote_hosts,
        "configuration": {
            "commandTimeout": state.config.command_timeout.as_millis() as u64,
            "timeoutMinutes": state.config.max_allowed_timeout.as_secs() / 60,
            "dangerousMode": state.config.modes.dangerous,
            "devCommands": state.config.modes.dev_commands,
            "authConfigured": state.config.auth_token.is_some(),
        },
    }))
}

async fn help() -> impl IntoResponse {
    (StatusCode::OK, "see the tools/list JSON-RPC method for the current tool catalog")
}

async fn mcp(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let client_ip = resolve_client_ip(&headers, peer);
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    let mut method_for_log = "-".to_string();
    let mut remaining_header: Option<u32> = None;

    let response = 'pipeline: {
        // Stage A: DefaultBodyLimit already rejected an oversized body with 413
        // before this handler runs. Here we only handle the parse failure case.
        let request: JsonRpcRequest = match serde_json::from_slice(&body) {
            Ok(r) => r,
            Err(_) => break 'pipeline AppError::ParseError.into_response(),
        };
        method_for_log = request.method.clone().unwrap_or_else(|| "-".to_string());

        // Stage D: rate limit.
        if state.config.modes.dangerous {
            logging::log_rate_limit_bypassed(&client_ip);
        } else if state.config.rate_limit.max_requests > 0 {
            let outcome = state
                .rate_limiter
                .check_limit(&client_ip, state.config.rate_limit.max_requests, state.config.rate_limit.window)
                .await;
            if !outcome.allowed {
                break 'pipeline AppError::RateLimited {
                    retry_after_secs: outcome.retry_after.as_secs(),
                }
                .into_response();
            }
            remaining_header = Some(outcome.remaining);
        }

        // Stage E: IP allowlist.
        if !state.config.allowed_ips.is_empty() {
            let allowed = client_ip
                .parse::<IpAddr>()
                .map(|addr| ip::is_allowed(&addr, &state.config.allowed_ips))
                .unwrap_or(false);
            if !allowed {
                break 'pipeline AppError::ForbiddenIp.into_response();
            }
        }

        // Stage F: bearer auth.
        if let Some(expected) = &state.config.auth_token {
            let provided = headers
                .get(axum::http::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .trim();
            let received = strip_bearer_prefix(provided);
            if !constant_time_eq(received, expected) {
                logging::log_auth_failure(expected, received, &client_ip);
                break 'pipeline AppError::Unauthorized.into_response();
            }
        }

        // Stage G: JSON-RPC shape check.
        let (id, method) = match rpc::validate_shape(&request) {
            Ok(pair) => pair,
            Err((id, reason)) => break 'pipeline AppError::InvalidRequest { id, reason }.into_response(),
        };

        // Stage H: method router.
        route_method(&method, request.params, id, &state).await
    };

    let mut response = response;
    if let Some(remaining) = remaining_header {
        if let Ok(value) = remaining.to_string().parse() {
            response.headers_mut().insert("X-RateLimit-Remaining", value);
        }
    }

    logging::log_access(&AccessLogRecord {
        client_ip: &client_ip,
        method: &method_for_log,
        path: "/mcp",
        user_agent,
        duration: start.elapsed(),
        status: response.status().as_u16(),
    });

    response
}

async fn route_method(method: &str, params: Option<Value>, id: JsonRpcId, state: &AppState) -> Response {
    let value = match method {
        "initialize" => json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {},
                "prompts": {},
                "logging": {},
            },
            "serverInfo": {
                "name": state.config.server_name,
                "version": state.config.server_version,
            },
        }),
        "ping" => json!({ "status": "pong" }),
        "shutdown" => json!({}),
        "tools/list" => json!({ "tools": tools::descriptors() }),
        "tools/call" => tools_call(params, &state.config).await,
        other => {
            return AppError::MethodNotFound {
                id,
                method: other.to_string(),
            }
            .into_response()
        }
    };

    Json(JsonRpcResponse::success(id, value)).into_response()
}

async fn tools_call(params: Option<Value>, config: &ServerConfig) -> Value {
    let params = params.unwrap_or(Value::Null);
    let name = match params.get("name").and_then(Value::as_str) {
        Some(name) => name,
        None => return json!({ "content": [{ "type": "text", "text": "Unknown tool: (missing name)" }] }),
    };
    let empty = Value::Null;
    let arguments = params.get("arguments").unwrap_or(&empty);
    dispatch::handle_tools_call(name, arguments, config).await
}

/// Stage C: prefer the first `X-Forwarded-For` entry, else the transport
/// peer address, else `"unknown"` (§4.1 Stage C).
fn resolve_client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| peer.ip().to_string())
}

fn strip_bearer_prefix(value: &str) -> &str {
    if value.len() >= 7 && value[..7].eq_ignore_ascii_case("bearer ") {
        value[7..].trim_start()
    } else {
        value
    }
}

/// Constant-time comparison over a fixed-size buffer so that timing does
/// not vary with either string's length (§4.1 Stage F, §8 invariant).
fn constant_time_eq(received: &str, expected: &str) -> bool {
    const BUF: usize = 256;
    let mut a = [0u8; BUF];
    let mut b = [0u8; BUF];
    let ra = received.as_bytes();
    let rb = expected.as_bytes();
    let la = ra.len().min(BUF);
    let lb = rb.len().min(BUF);
    a[..la].copy_from_slice(&ra[..la]);
    b[..lb].copy_from_slice(&rb[..lb]);

    let content_eq: bool = a.ct_eq(&b).into();
    let len_eq: bool = (ra.len() as u64).ct_eq(&(rb.len() as u64)).into();
    content_eq & len_eq
}
