//! Integration tests for the JSON-RPC envelope and shape validator (§4.1
//! Stage G).

use mcp_exec_daemon::rpc::{self, JsonRpcId, JsonRpcRequest};

fn request(jsonrpc: Option<&str>, id: Option<JsonRpcId>, method: Option<&str>) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: jsonrpc.map(str::to_string),
        id: id.map(Some),
        method: method.map(str::to_string),
        params: None,
    }
}

#[test]
fn accepts_a_well_formed_request() {
    let req = request(Some("2.0"), Some(JsonRpcId::Number(1)), Some("ping"));
    let (id, method) = rpc::validate_shape(&req).unwrap();
    assert_eq!(id, JsonRpcId::Number(1));
    assert_eq!(method, "ping");
}

#[test]
fn rejects_a_wrong_jsonrpc_version() {
    let req = request(Some("1.0"), Some(JsonRpcId::Number(1)), Some("ping"));
    assert!(rpc::validate_shape(&req).is_err());
}

#[test]
fn rejects_a_missing_id() {
    let req = request(Some("2.0"), None, Some("ping"));
    let err = rpc::validate_shape(&req).unwrap_err();
    assert!(err.1.contains("id is required"));
}

#[test]
fn a_null_id_is_accepted_as_present() {
    let req = request(Some("2.0"), Some(JsonRpcId::Null), Some("ping"));
    assert!(rpc::validate_shape(&req).is_ok());
}

#[test]
fn a_real_wire_null_id_is_accepted_as_present() {
    // Exercises actual serde_json deserialization (not a hand-built struct
    // literal) -- an explicit `"id": null` must not collapse into the
    // "id is missing" rejection path.
    let req: JsonRpcRequest =
        serde_json::from_str(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
    let (id, method) = rpc::validate_shape(&req).unwrap();
    assert_eq!(id, JsonRpcId::Null);
    assert_eq!(method, "ping");
}

#[test]
fn a_real_wire_body_omitting_id_entirely_is_rejected() {
    let req: JsonRpcRequest = serde_json::from_str(r#"{"jsonrpc":"2.0","method":"ping"}"#).unwrap();
    let err = rpc::validate_shape(&req).unwrap_err();
    assert!(err.1.contains("id is required"));
}

#[test]
fn rejects_an_empty_method_name() {
    let req = request(Some("2.0"), Some(JsonRpcId::Number(1)), Some(""));
    assert!(rpc::validate_shape(&req).is_err());
}

#[test]
fn rejects_a_missing_method() {
    let req = request(Some("2.0"), Some(JsonRpcId::Number(1)), None);
    assert!(rpc::validate_shape(&req).is_err());
}

#[test]
fn string_ids_round_trip_through_validation() {
    let req = request(Some("2.0"), Some(JsonRpcId::String("abc".to_string())), Some("ping"));
    let (id, _) = rpc::validate_shape(&req).unwrap();
    assert_eq!(id, JsonRpcId::String("abc".to_string()));
}

#[test]
fn success_and_error_responses_serialize_with_mutually_exclusive_fields() {
    let success = rpc::JsonRpcResponse::success(JsonRpcId::Number(1), serde_json::json!({"ok": true}));
    let value = serde_json::to_value(&success).unwrap();
    assert!(value.get("result").is_some());
    assert!(value.get("error").is_none());

    let error = rpc::JsonRpcResponse::error(JsonRpcId::Number(1), rpc::JsonRpcError::method_not_found("x"));
    let value = serde_json::to_value(&error).unwrap();
    assert!(value.get("error").is_some());
    assert!(value.get("result").is_none());
}
