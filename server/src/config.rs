//! Server configuration, entirely environment-variable driven.
//!
//! Every setting has a documented default; nothing here reads a config
//! file. Precedence is simply "env var if set, else the default" — there
//! is no multi-source layering to reason about.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Stdio,
    WebSocket,
    Both,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub transport: TransportKind,
    pub websocket_port: u16,
    pub max_agents: usize,
    pub max_sessions_per_agent: usize,
    pub max_total_sessions: usize,
    pub rate_limit_general_per_min: u32,
    pub rate_limit_moves_per_min: u32,
    pub rate_limit_burst_per_10s: u32,
    pub encryption_enabled: bool,
    pub encryption_session_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            transport: env_transport("MCP_TRANSPORT", TransportKind::Stdio),
            websocket_port: env_u16("MCP_WEBSOCKET_PORT", 8082),
            max_agents: env_usize("MCP_MAX_AGENTS", 100),
            max_sessions_per_agent: env_usize("MCP_MAX_SESSIONS_PER_AGENT", 10),
            max_total_sessions: env_usize("MCP_MAX_TOTAL_SESSIONS", 1000),
            rate_limit_general_per_min: env_u32("MCP_RATE_LIMIT_GENERAL_PER_MIN", 100),
            rate_limit_moves_per_min: env_u32("MCP_RATE_LIMIT_MOVES_PER_MIN", 60),
            rate_limit_burst_per_10s: env_u32("MCP_RATE_LIMIT_BURST_PER_10S", 10),
            encryption_enabled: env_bool("MCP_ENCRYPTION_ENABLED", false),
            encryption_session_timeout: Duration::from_secs(
                60 * env_u64("MCP_ENCRYPTION_SESSION_TIMEOUT_MINUTES", 30),
            ),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_transport(key: &str, default: TransportKind) -> TransportKind {
    match std::env::var(key).ok().as_deref() {
        Some("websocket") => TransportKind::WebSocket,
        Some("stdio") => TransportKind::Stdio,
        Some("both") => TransportKind::Both,
        _ => default,
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_limits() {
        std::env::remove_var("MCP_MAX_SESSIONS_PER_AGENT");
        let config = ServerConfig::from_env();
        assert_eq!(config.max_sessions_per_agent, 10);
        assert_eq!(config.max_total_sessions, 1000);
        assert_eq!(config.rate_limit_burst_per_10s, 10);
    }

    #[test]
    fn transport_recognizes_both() {
        assert_eq!(env_transport("MCP_TRANSPORT_DOES_NOT_EXIST", TransportKind::Both), TransportKind::Both);
        std::env::set_var("MCP_TRANSPORT_TEST", "both");
        assert_eq!(env_transport("MCP_TRANSPORT_TEST", TransportKind::Stdio), TransportKind::Both);
        std::env::remove_var("MCP_TRANSPORT_TEST");
    }
}
