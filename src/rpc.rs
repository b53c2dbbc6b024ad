//! JSON-RPC 2.0 envelope types and the MCP method table.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum JsonRpcId {
    Number(i64),
    String(String),
    Null,
}

/// Parsed JSON-RPC request envelope.
///
/// `id` is `Option<Option<JsonRpcId>>` so that an omitted `id` key (outer
/// `None`) stays distinguishable from an explicit `"id": null` (`Some(None)`)
/// -- `serde_json` collapses both to plain `None` for a field typed as a
/// single `Option<T>`, since a JSON `null` always short-circuits to the
/// "absent" arm of `Option<T>`'s `Deserialize` impl before `T` ever gets a
/// chance to represent it. Only the key's total absence is rejected at
/// Stage G (§4.1); a present-but-null `id` is valid per JSON-RPC 2.0.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present_id")]
    pub id: Option<Option<JsonRpcId>>,
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Runs only when the `id` key is present in the JSON object (`#[serde(default)]`
/// supplies the outer `None` when it's absent entirely, without ever calling
/// this function) -- so reaching this function at all already proves presence,
/// and the inner `Option<JsonRpcId>` tells us whether the value was `null`.
fn deserialize_present_id<'de, D>(deserializer: D) -> Result<Option<Option<JsonRpcId>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<JsonRpcId>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: JsonRpcId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: JsonRpcId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: JsonRpcId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn parse_error() -> Self {
        Self {
            code: -32700,
            message: "Parse error".to_string(),
            data: None,
        }
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self {
            code: -32600,
            message: "Invalid Request".to_string(),
            data: Some(Value::String(msg.into())),
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(Value::String(method.to_string())),
        }
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: "Internal error".to_string(),
            data: Some(Value::String(msg.into())),
        }
    }
}

/// Validate the JSON-RPC shape of an already-parsed request (§4.1 Stage G).
///
/// Returns the request's `id` (for echoing back in error responses) and the
/// validated method name, or a descriptive rejection reason.
pub fn validate_shape(req: &JsonRpcRequest) -> Result<(JsonRpcId, String), (JsonRpcId, String)> {
    let id = match &req.id {
        Some(Some(id)) => id.clone(),
        Some(None) | None => JsonRpcId::Null,
    };

    if req.jsonrpc.as_deref() != Some("2.0") {
        return Err((id, "jsonrpc must equal \"2.0\"".to_string()));
    }
    if req.id.is_none() {
        return Err((id, "id is required (may be null)".to_string()));
    }
    let method = match &req.method {
        Some(m) if !m.is_empty() => m.clone(),
        _ => return Err((id, "method must be a non-empty string".to_string())),
    };

    Ok((id, method))
}
