//! `AppError` — the single error taxonomy the whole server maps into
//! JSON-RPC error objects at the `RpcRouter` boundary (spec §6, §7).

use serde::Serialize;

use crate::jsonrpc::JsonRpcError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    #[error("parse error")]
    Parse,
    #[error("invalid request")]
    InvalidRequest,
    #[error("method not found: {0}")]
    MethodNotFound(String),
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("invalid move: {message}")]
    InvalidMove { message: String, legal_moves: Option<Vec<String>> },
    #[error("engine timed out")]
    EngineTimeout,
    #[error("session limit reached")]
    SessionLimit,
    #[error("unknown engine: {0}")]
    UnknownEngine(String),
    #[error("game has already ended")]
    TerminalGame,
}

impl AppError {
    /// JSON-RPC error code per the §6 taxonomy.
    pub fn code(&self) -> i64 {
        match self {
            AppError::Parse => -32700,
            AppError::InvalidRequest => -32600,
            AppError::MethodNotFound(_) => -32601,
            AppError::InvalidParams(_) => -32602,
            AppError::Internal(_) => -32603,
            AppError::Unauthorized => -32001,
            AppError::RateLimited => -32099,
            AppError::SessionNotFound(_) => -32010,
            AppError::InvalidMove { .. } => -32011,
            AppError::EngineTimeout => -32012,
            AppError::SessionLimit => -32013,
            AppError::UnknownEngine(_) => -32602,
            AppError::TerminalGame => -32011,
        }
    }

    pub fn to_json_rpc_error(&self) -> JsonRpcError {
        JsonRpcError {
            code: self.code(),
            message: self.to_string(),
            data: self.error_data(),
        }
    }

    fn error_data(&self) -> Option<serde_json::Value> {
        match self {
            AppError::InvalidMove { legal_moves: Some(moves), .. } => {
                Some(serde_json::json!({ "legalMoves": moves }))
            }
            AppError::InvalidParams(detail) => Some(serde_json::json!({ "detail": detail })),
            _ => None,
        }
    }
}

impl From<chess::RuleError> for AppError {
    fn from(e: chess::RuleError) -> Self {
        AppError::InvalidMove { message: e.to_string(), legal_moves: None }
    }
}

impl From<engine::EngineError> for AppError {
    fn from(e: engine::EngineError) -> Self {
        match e {
            engine::EngineError::Timeout => AppError::EngineTimeout,
            engine::EngineError::UnknownEngine(name) => AppError::UnknownEngine(name),
            engine::EngineError::NoLegalMoves => AppError::TerminalGame,
            engine::EngineError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: i64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_maps_to_the_documented_code() {
        assert_eq!(AppError::RateLimited.code(), -32099);
    }

    #[test]
    fn session_errors_map_to_their_documented_codes() {
        assert_eq!(AppError::SessionNotFound("x".into()).code(), -32010);
        assert_eq!(AppError::InvalidMove { message: "x".into(), legal_moves: None }.code(), -32011);
        assert_eq!(AppError::EngineTimeout.code(), -32012);
        assert_eq!(AppError::SessionLimit.code(), -32013);
        assert_eq!(AppError::Unauthorized.code(), -32001);
    }

    #[test]
    fn invalid_move_data_carries_the_legal_move_list() {
        let err = AppError::InvalidMove { message: "illegal move".into(), legal_moves: Some(vec!["e2e4".into()]) };
        let data = err.to_json_rpc_error().data.unwrap();
        assert_eq!(data["legalMoves"][0], "e2e4");
    }
}
