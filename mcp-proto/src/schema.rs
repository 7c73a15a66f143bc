//! Declarative tool/resource catalogue (spec §4.11).
//!
//! `ToolRegistry`/`ResourceRegistry` in the server crate hold the runtime
//! dispatch tables; the static descriptions here are what `tools/list` and
//! `resources/list` echo back to clients and what request validation
//! checks `tools/call` arguments against.

use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: fn() -> Value,
}

#[derive(Debug, Clone)]
pub struct ResourceSpec {
    pub uri: &'static str,
    pub description: &'static str,
}

/// The eight tools a `tools/list` call must enumerate exactly, per §4.11.
pub const TOOLS: [ToolSpec; 8] = [
    ToolSpec {
        name: "create_chess_game",
        description: "Start a new chess game against a named AI engine.",
        input_schema: create_chess_game_schema,
    },
    ToolSpec {
        name: "make_chess_move",
        description: "Play a move in UCI coordinate notation.",
        input_schema: make_chess_move_schema,
    },
    ToolSpec {
        name: "get_board_state",
        description: "Read a session's current board, turn, and status.",
        input_schema: session_id_only_schema,
    },
    ToolSpec {
        name: "analyze_position",
        description: "Run a read-only engine search on the current position.",
        input_schema: analyze_position_schema,
    },
    ToolSpec {
        name: "get_legal_moves",
        description: "Enumerate legal moves for the side to move.",
        input_schema: session_id_only_schema,
    },
    ToolSpec {
        name: "get_move_hint",
        description: "Ask the session's engine for a move suggestion.",
        input_schema: get_move_hint_schema,
    },
    ToolSpec {
        name: "create_tournament",
        description: "Create one session per AI engine, twelve in parallel.",
        input_schema: create_tournament_schema,
    },
    ToolSpec {
        name: "get_tournament_status",
        description: "Summarize the calling agent's active sessions.",
        input_schema: empty_schema,
    },
];

/// The six resource URIs a `resources/list` call must enumerate, per §4.11.
pub const RESOURCES: [ResourceSpec; 6] = [
    ResourceSpec { uri: "chess://ai-systems", description: "Static catalogue of the twelve AI engines." },
    ResourceSpec { uri: "chess://opening-book", description: "Read-only opening catalogue." },
    ResourceSpec { uri: "chess://game-sessions", description: "The calling agent's own sessions." },
    ResourceSpec {
        uri: "chess://game-sessions/{sessionId}",
        description: "A single session's state, ownership required.",
    },
    ResourceSpec { uri: "chess://training-stats", description: "Static reference training statistics." },
    ResourceSpec { uri: "chess://tactical-patterns", description: "Static reference tactical pattern catalogue." },
];

fn create_chess_game_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "aiOpponent": { "type": "string", "enum": engine::ENGINE_NAMES },
            "playerColor": { "type": "string", "enum": ["white", "black"] },
            "difficulty": { "type": "integer", "minimum": 1, "maximum": 10, "default": 5 }
        },
        "required": ["aiOpponent", "playerColor"],
        "additionalProperties": false
    })
}

fn make_chess_move_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "sessionId": { "type": "string", "pattern": "^chess-session-.+$" },
            "move": { "type": "string", "pattern": "^[a-h][1-8][a-h][1-8][qrbn]?$" }
        },
        "required": ["sessionId", "move"],
        "additionalProperties": false
    })
}

fn session_id_only_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "sessionId": { "type": "string", "pattern": "^chess-session-.+$" }
        },
        "required": ["sessionId"],
        "additionalProperties": false
    })
}

fn analyze_position_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "sessionId": { "type": "string", "pattern": "^chess-session-.+$" },
            "depth": { "type": "integer", "minimum": 1, "maximum": 10 }
        },
        "required": ["sessionId"],
        "additionalProperties": false
    })
}

fn get_move_hint_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "sessionId": { "type": "string", "pattern": "^chess-session-.+$" },
            "hintLevel": { "type": "integer", "minimum": 1, "maximum": 3 }
        },
        "required": ["sessionId"],
        "additionalProperties": false
    })
}

fn create_tournament_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "playerColor": { "type": "string", "enum": ["white", "black"] },
            "difficulty": { "type": "integer", "minimum": 1, "maximum": 10, "default": 5 }
        },
        "required": ["playerColor"],
        "additionalProperties": false
    })
}

fn empty_schema() -> Value {
    json!({ "type": "object", "additionalProperties": false })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_eight_tools_are_declared() {
        assert_eq!(TOOLS.len(), 8);
    }

    #[test]
    fn exactly_six_resources_are_declared() {
        assert_eq!(RESOURCES.len(), 6);
    }

    #[test]
    fn every_tool_schema_is_an_object() {
        for tool in TOOLS {
            let schema = (tool.input_schema)();
            assert_eq!(schema["type"], "object");
        }
    }
}
