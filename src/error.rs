//! Crate-wide error taxonomy and its mapping onto HTTP + JSON-RPC responses.
//!
//! Mirrors the error taxonomy in the design doc: transport / policy /
//! validation / execution / SSH / internal. Only transport and internal
//! errors ever produce a non-200 JSON-RPC envelope -- policy errors carry
//! their own status codes, and validation/execution errors are folded into
//! a successful (200) MCP text result by the dispatcher.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::rpc::{JsonRpcError, JsonRpcId, JsonRpcResponse};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Parse error")]
    ParseError,

    #[error("request body exceeds the maximum allowed size")]
    PayloadTooLarge,

    #[error("Invalid Request")]
    InvalidRequest { id: JsonRpcId, reason: String },

    #[error("Method not found: {method}")]
    MethodNotFound { id: JsonRpcId, method: String },

    #[error("rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    #[error("client IP not in allowlist")]
    ForbiddenIp,

    #[error("authentication failed")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

#[derive(Debug, Serialize)]
struct PolicyErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::ParseError => (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(
                    JsonRpcId::Null,
                    JsonRpcError::parse_error(),
                )),
            )
                .into_response(),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(PolicyErrorBody {
                    error: "request body too large".to_string(),
                    retry_after: None,
                }),
            )
                .into_response(),
            AppError::InvalidRequest { id, reason } => (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::error(id, JsonRpcError::invalid_request(reason))),
            )
                .into_response(),
            AppError::MethodNotFound { id, method } => (
                StatusCode::OK,
                Json(JsonRpcResponse::error(id, JsonRpcError::method_not_found(&method))),
            )
                .into_response(),
            AppError::RateLimited { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(PolicyErrorBody {
                    error: "rate limit exceeded".to_string(),
                    retry_after: Some(retry_after_secs),
                }),
            )
                .into_response(),
            AppError::ForbiddenIp => (
                StatusCode::FORBIDDEN,
                Json(PolicyErrorBody {
                    error: "client IP not permitted".to_string(),
                    retry_after: None,
                }),
            )
                .into_response(),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(PolicyErrorBody {
                    error: "unauthorized".to_string(),
                    retry_after: None,
                }),
            )
                .into_response(),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(JsonRpcResponse::error(
                    JsonRpcId::Null,
                    JsonRpcError::internal_error(msg),
                )),
            )
                .into_response(),
        }
    }
}
