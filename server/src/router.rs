//! `RpcRouter` — decode, validate, rate-limit, dispatch, encode (spec
//! §4.12). One entry point (`handle_line`) that both transports feed their
//! decoded text frames into: a single dispatch table behind multiple
//! transports, per §4.13.

use mcp_proto::jsonrpc::validate_envelope;
use mcp_proto::{AppError, EncryptedEnvelope, JsonRpcRequest, JsonRpcResponse, RequestId, TOOLS};
use serde_json::{json, Value};

use crate::agent::ClientInfo;
use crate::rate_limit::MethodClass;
use crate::resources::ResourceRegistry;
use crate::tools::ToolRegistry;
use crate::AppState;

pub struct RpcRouter {
    state: std::sync::Arc<AppState>,
}

impl RpcRouter {
    pub fn new(state: std::sync::Arc<AppState>) -> Self {
        Self { state }
    }

    /// Decode one transport frame, dispatch it, and encode the reply (if
    /// any — notifications produce no response). Handles both plaintext
    /// and, when encryption is enabled, the `EncryptedEnvelope` wire format
    /// (spec §4.10).
    pub async fn handle_line(&self, agent_id: &str, raw: &str) -> Option<String> {
        let parsed: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(_) => return Some(error_line(None, AppError::Parse)),
        };

        let is_encrypted = parsed.get("encrypted").and_then(Value::as_bool).unwrap_or(false);
        if is_encrypted {
            return self.handle_encrypted(agent_id, parsed).await;
        }

        let request: JsonRpcRequest = match serde_json::from_value(parsed) {
            Ok(r) => r,
            Err(_) => return Some(error_line(None, AppError::Parse)),
        };

        self.handle_request(agent_id, request).await.map(|resp| serde_json::to_string(&resp).expect("JsonRpcResponse always serializes"))
    }

    async fn handle_encrypted(&self, agent_id: &str, value: Value) -> Option<String> {
        let Some(ratchet) = &self.state.ratchet else {
            return Some(error_line(None, AppError::Parse));
        };
        let envelope: EncryptedEnvelope = match serde_json::from_value(value) {
            Ok(e) => e,
            Err(_) => return Some(error_line(None, AppError::Parse)),
        };

        // §4.10: the transport cannot distinguish malformed ciphertext from
        // a wrong-key decrypt, so both collapse to a parse error.
        let plaintext = match ratchet.decrypt_inbound(agent_id, &envelope).await {
            Ok(p) => p,
            Err(_) => return Some(error_line(None, AppError::Parse)),
        };
        let request: JsonRpcRequest = match serde_json::from_slice(&plaintext) {
            Ok(r) => r,
            Err(_) => return Some(error_line(None, AppError::Parse)),
        };

        let response = self.handle_request(agent_id, request).await?;
        let response_bytes = serde_json::to_vec(&response).expect("JsonRpcResponse always serializes");
        match ratchet.encrypt_outbound(agent_id, &response_bytes).await {
            Ok(out) => Some(serde_json::to_string(&out).expect("EncryptedEnvelope always serializes")),
            Err(_) => Some(error_line(response.id, AppError::Internal("failed to encrypt response".to_string()))),
        }
    }

    async fn handle_request(&self, agent_id: &str, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();

        if let Err(e) = validate_envelope(&request) {
            return Some(JsonRpcResponse::failure(id, e.to_json_rpc_error()));
        }

        self.state.agents.touch(agent_id);

        let class = method_class(&request);
        if !self.state.rate_limiter.admit(agent_id, class) {
            return Some(JsonRpcResponse::failure(id, AppError::RateLimited.to_json_rpc_error()));
        }

        match self.dispatch(agent_id, &request).await {
            Ok(result) => Some(JsonRpcResponse::success(id, result)),
            Err(e) => Some(JsonRpcResponse::failure(id, e.to_json_rpc_error())),
        }
    }

    async fn dispatch(&self, agent_id: &str, request: &JsonRpcRequest) -> Result<Value, AppError> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(agent_id, request.params.clone()),
            "tools/list" => Ok(tools_list()),
            "resources/list" => Ok(resources_list()),
            "tools/call" => self.handle_tools_call(agent_id, request.params.clone()).await,
            "resources/read" => self.handle_resources_read(agent_id, request.params.clone()).await,
            other => Err(AppError::MethodNotFound(other.to_string())),
        }
    }

    fn handle_initialize(&self, agent_id: &str, params: Option<Value>) -> Result<Value, AppError> {
        let client_info = params
            .as_ref()
            .and_then(|p| p.get("clientInfo"))
            .and_then(|c| serde_json::from_value::<RawClientInfo>(c.clone()).ok())
            .map(|c| ClientInfo { name: c.name, version: c.version })
            .unwrap_or(ClientInfo { name: "unknown".to_string(), version: "0".to_string() });

        self.state.agents.update_client_info(agent_id, client_info);

        Ok(json!({
            "protocolVersion": "2024-11-05",
            "serverInfo": { "name": "mcp-chess-server", "version": env!("CARGO_PKG_VERSION") },
            "capabilities": { "tools": {}, "resources": {} },
        }))
    }

    async fn handle_tools_call(&self, agent_id: &str, params: Option<Value>) -> Result<Value, AppError> {
        let params = params.ok_or_else(|| AppError::InvalidParams("tools/call requires params".to_string()))?;
        let call: ToolCallParams = serde_json::from_value(params).map_err(|e| AppError::InvalidParams(e.to_string()))?;
        let result = ToolRegistry::dispatch(&self.state, agent_id, &call.name, call.arguments.unwrap_or(Value::Object(Default::default()))).await?;
        Ok(json!({ "content": result }))
    }

    async fn handle_resources_read(&self, agent_id: &str, params: Option<Value>) -> Result<Value, AppError> {
        let params = params.ok_or_else(|| AppError::InvalidParams("resources/read requires params".to_string()))?;
        let read: ResourceReadParams = serde_json::from_value(params).map_err(|e| AppError::InvalidParams(e.to_string()))?;
        let result = ResourceRegistry::read(&self.state, agent_id, &read.uri).await?;
        Ok(json!({ "contents": result }))
    }
}

#[derive(serde::Deserialize)]
struct RawClientInfo {
    name: String,
    version: String,
}

#[derive(serde::Deserialize)]
struct ToolCallParams {
    name: String,
    arguments: Option<Value>,
}

#[derive(serde::Deserialize)]
struct ResourceReadParams {
    uri: String,
}

fn method_class(request: &JsonRpcRequest) -> MethodClass {
    if request.method == "tools/call" {
        let is_move_call = request
            .params
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .map(|name| name == "make_chess_move")
            .unwrap_or(false);
        if is_move_call {
            return MethodClass::Move;
        }
    }
    MethodClass::General
}

fn tools_list() -> Value {
    let tools: Vec<Value> = TOOLS
        .iter()
        .map(|t| json!({ "name": t.name, "description": t.description, "inputSchema": (t.input_schema)() }))
        .collect();
    json!({ "tools": tools })
}

fn resources_list() -> Value {
    let resources: Vec<Value> = mcp_proto::RESOURCES
        .iter()
        .map(|r| json!({ "uri": r.uri, "description": r.description }))
        .collect();
    json!({ "resources": resources })
}

fn error_line(id: Option<RequestId>, error: AppError) -> String {
    let response = JsonRpcResponse::failure(id, error.to_json_rpc_error());
    serde_json::to_string(&response).expect("JsonRpcResponse always serializes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn router() -> RpcRouter {
        RpcRouter::new(AppState::new(ServerConfig::from_env()))
    }

    #[tokio::test]
    async fn initialize_then_tools_list_enumerates_all_tools() {
        let router = router();
        router.state.agents.register_or_touch(Some("agent-1"), ClientInfo { name: "t".into(), version: "1".into() }, crate::agent::TransportTag::Stdio).ok();

        let init = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","clientInfo":{"name":"t","version":"1"}}}"#;
        let response = router.handle_line("agent-1", init).await.unwrap();
        assert!(response.contains("\"capabilities\""));

        let list = r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#;
        let response = router.handle_line("agent-1", list).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["result"]["tools"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn unknown_method_maps_to_method_not_found() {
        let router = router();
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"nonexistent"}"#;
        let response = router.handle_line("agent-1", request).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn wrong_protocol_version_is_invalid_request() {
        let router = router();
        let request = r#"{"jsonrpc":"1.0","id":1,"method":"tools/list"}"#;
        let response = router.handle_line("agent-1", request).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let router = router();
        let response = router.handle_line("agent-1", "{not json").await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn create_then_illegal_move_reports_legal_moves() {
        let router = router();
        let create = r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"create_chess_game","arguments":{"aiOpponent":"Negamax","playerColor":"white","difficulty":1}}}"#;
        let response = router.handle_line("agent-1", create).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        let session_id = value["result"]["content"]["sessionId"].as_str().unwrap().to_string();

        let bad_move = json!({
            "jsonrpc": "2.0", "id": 2, "method": "tools/call",
            "params": { "name": "make_chess_move", "arguments": { "sessionId": session_id, "move": "e2e5" } }
        });
        let response = router.handle_line("agent-1", &bad_move.to_string()).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["error"]["code"], -32011);
        assert!(value["error"]["data"]["legalMoves"].as_array().unwrap().iter().any(|m| m == "e2e4"));
    }

    #[tokio::test]
    async fn cross_agent_session_access_is_unauthorized() {
        let router = router();
        let create = json!({
            "jsonrpc": "2.0", "id": 1, "method": "tools/call",
            "params": { "name": "create_chess_game", "arguments": { "aiOpponent": "Negamax", "playerColor": "white" } }
        });
        let response = router.handle_line("agent-a", &create.to_string()).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        let session_id = value["result"]["content"]["sessionId"].as_str().unwrap().to_string();

        let read = json!({
            "jsonrpc": "2.0", "id": 2, "method": "tools/call",
            "params": { "name": "get_board_state", "arguments": { "sessionId": session_id } }
        });
        let response = router.handle_line("agent-b", &read.to_string()).await.unwrap();
        let value: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["error"]["code"], -32001);
    }
}
