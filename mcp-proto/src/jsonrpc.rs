//! JSON-RPC 2.0 envelope types (spec §6, §4.12).
//!
//! Deliberately permissive on `id` (request id can be a string, number, or
//! absent for notifications) and on `params`/`result` (left as
//! `serde_json::Value` and decoded per-method by the tool/resource
//! handlers, which know their own schemas).

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub id: Option<RequestId>,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self { jsonrpc: JSONRPC_VERSION.to_string(), id, result: Some(result), error: None }
    }

    pub fn failure(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self { jsonrpc: JSONRPC_VERSION.to_string(), id, result: None, error: Some(error) }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Server-initiated asynchronous event (AI move played, game ended,
/// tournament progress) delivered with no `id`, per §4.9/§6.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self { jsonrpc: JSONRPC_VERSION.to_string(), method: method.into(), params }
    }
}

/// Validates the envelope fields the router checks before dispatch
/// (spec §4.12): `jsonrpc` must be exactly `"2.0"` and `method` non-empty.
pub fn validate_envelope(request: &JsonRpcRequest) -> Result<(), crate::error::AppError> {
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(crate::error::AppError::InvalidRequest);
    }
    if request.method.trim().is_empty() {
        return Err(crate::error::AppError::InvalidRequest);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_a_wrong_protocol_version() {
        let request = JsonRpcRequest {
            jsonrpc: "1.0".to_string(),
            method: "initialize".to_string(),
            id: Some(RequestId::Number(1)),
            params: None,
        };
        assert!(validate_envelope(&request).is_err());
    }

    #[test]
    fn accepts_a_well_formed_request() {
        let request = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: "tools/list".to_string(),
            id: Some(RequestId::Number(2)),
            params: None,
        };
        assert!(validate_envelope(&request).is_ok());
    }

    #[test]
    fn notification_has_no_id() {
        let request = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: "progress".to_string(),
            id: None,
            params: None,
        };
        assert!(request.is_notification());
    }
}
