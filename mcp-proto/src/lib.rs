//! JSON-RPC 2.0 envelope types, the server-wide error taxonomy, and the
//! declarative tool/resource schema catalogue (spec §4.11, §4.12, §6).
//!
//! Kept as its own crate so `chess`, `engine`, and `server` can each depend
//! on the shared wire vocabulary without `server` being the only place
//! that knows what a JSON-RPC error code means.

pub mod error;
pub mod jsonrpc;
pub mod ratchet_wire;
pub mod schema;

pub use error::AppError;
pub use jsonrpc::{JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId};
pub use ratchet_wire::{EncryptedEnvelope, RatchetHeader};
pub use schema::{ResourceSpec, ToolSpec, RESOURCES, TOOLS};
