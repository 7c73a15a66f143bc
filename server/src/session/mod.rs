//! `SessionManager` — session lifecycle, the agent↔session index, and the
//! per-agent/global cardinality limits (spec §4.6).
//!
//! One actor task per session behind a `SessionHandle`, with a single
//! `RwLock`-guarded index structure so the two maps (`sessionId → handle`,
//! `agentId → sessionIds`) are always updated together — the spec's
//! "records both indexes atomically" requirement for `create`/`end`.

mod actor;
pub mod commands;
mod deps;
mod handle;
mod snapshot;
mod state;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use engine::{EngineDispatcher, EngineRegistry};
use tokio::sync::{mpsc, RwLock};

use crate::agent::short_nonce;
use crate::notify::NotificationBus;
use actor::run_session_actor;
pub use commands::{AnalysisResult, MoveBy, MoveRecord, MoveResult, SessionError, SessionStatus};
use deps::SessionDeps;
pub use handle::SessionHandle;
pub use snapshot::SessionSnapshot;
use state::SessionState;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionManagerError {
    #[error("unknown engine: {0}")]
    UnknownEngine(String),
    #[error("session limit reached")]
    SessionLimit,
    #[error("session not found: {0}")]
    SessionNotFound(String),
}

struct Index {
    sessions: HashMap<String, SessionHandle>,
    by_agent: HashMap<String, HashSet<String>>,
}

pub struct SessionManager {
    index: RwLock<Index>,
    engine_registry: Arc<EngineRegistry>,
    engine_dispatcher: Arc<EngineDispatcher>,
    notification_bus: Arc<NotificationBus>,
    max_sessions_per_agent: usize,
    max_total_sessions: usize,
}

impl SessionManager {
    pub fn new(
        engine_registry: Arc<EngineRegistry>,
        engine_dispatcher: Arc<EngineDispatcher>,
        notification_bus: Arc<NotificationBus>,
        max_sessions_per_agent: usize,
        max_total_sessions: usize,
    ) -> Self {
        Self {
            index: RwLock::new(Index { sessions: HashMap::new(), by_agent: HashMap::new() }),
            engine_registry,
            engine_dispatcher,
            notification_bus,
            max_sessions_per_agent,
            max_total_sessions,
        }
    }

    /// `create_chess_game` — spec §4.6/§4.11. Rejects `UnknownEngine`
    /// (case-insensitively resolved via `EngineRegistry`) before touching
    /// the index, and `SessionLimit` if either cap would be exceeded.
    pub async fn create(
        &self,
        agent_id: &str,
        ai_opponent: &str,
        player_color: chess::PieceColor,
        difficulty: u8,
    ) -> Result<SessionSnapshot, SessionManagerError> {
        let engine = self
            .engine_registry
            .get(ai_opponent)
            .ok_or_else(|| SessionManagerError::UnknownEngine(ai_opponent.to_string()))?;
        let canonical_name = engine.name().to_string();

        let mut index = self.index.write().await;
        let per_agent = index.by_agent.get(agent_id).map(HashSet::len).unwrap_or(0);
        if per_agent >= self.max_sessions_per_agent || index.sessions.len() >= self.max_total_sessions {
            return Err(SessionManagerError::SessionLimit);
        }

        let session_id = format!("chess-session-{agent_id}-{}", short_nonce());
        let deps = SessionDeps {
            engine_dispatcher: self.engine_dispatcher.clone(),
            notification_bus: self.notification_bus.clone(),
        };
        let state = SessionState::new(
            session_id.clone(),
            agent_id.to_string(),
            canonical_name,
            player_color,
            difficulty.clamp(1, 10),
            now(),
            deps,
        );

        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        tokio::spawn(run_session_actor(state, cmd_rx));
        let handle = SessionHandle::new(agent_id.to_string(), cmd_tx);

        index.sessions.insert(session_id.clone(), handle.clone());
        index.by_agent.entry(agent_id.to_string()).or_default().insert(session_id.clone());
        drop(index);

        handle.snapshot().await.map_err(|_| SessionManagerError::SessionNotFound(session_id))
    }

    pub async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.index.read().await.sessions.get(session_id).cloned()
    }

    pub async fn agent_sessions(&self, agent_id: &str) -> Vec<String> {
        self.index
            .read()
            .await
            .by_agent
            .get(agent_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Releases both index entries atomically, then shuts down the actor.
    pub async fn end(&self, session_id: &str) -> Result<(), SessionManagerError> {
        let handle = {
            let mut index = self.index.write().await;
            let handle = index
                .sessions
                .remove(session_id)
                .ok_or_else(|| SessionManagerError::SessionNotFound(session_id.to_string()))?;
            if let Some(set) = index.by_agent.get_mut(handle.owner()) {
                set.remove(session_id);
            }
            handle
        };
        handle.shutdown().await;
        Ok(())
    }

    /// Called from `AgentRegistry`'s sweep (spec §4.7) to tear down every
    /// session an expired agent still owns.
    pub async fn end_all_for_agent(&self, agent_id: &str) {
        let owned = self.agent_sessions(agent_id).await;
        for session_id in owned {
            let _ = self.end(&session_id).await;
        }
    }

    pub async fn total_sessions(&self) -> usize {
        self.index.read().await.sessions.len()
    }
}

fn now() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(max_per_agent: usize, max_total: usize) -> SessionManager {
        let registry = Arc::new(EngineRegistry::new());
        let dispatcher = Arc::new(EngineDispatcher::new(registry.clone()));
        let bus = Arc::new(NotificationBus::new());
        SessionManager::new(registry, dispatcher, bus, max_per_agent, max_total)
    }

    #[tokio::test]
    async fn create_rejects_unknown_engines() {
        let manager = manager(10, 1000);
        let err = manager.create("agent-1", "NotAnEngine", chess::PieceColor::White, 3).await.unwrap_err();
        assert!(matches!(err, SessionManagerError::UnknownEngine(_)));
    }

    #[tokio::test]
    async fn create_resolves_engine_names_case_insensitively() {
        let manager = manager(10, 1000);
        let snapshot = manager.create("agent-1", "negamax", chess::PieceColor::White, 3).await.unwrap();
        assert_eq!(snapshot.ai_opponent, "Negamax");
    }

    #[tokio::test]
    async fn per_agent_session_limit_is_enforced() {
        let manager = manager(2, 1000);
        manager.create("agent-1", "Negamax", chess::PieceColor::White, 1).await.unwrap();
        manager.create("agent-1", "Negamax", chess::PieceColor::White, 1).await.unwrap();
        let err = manager.create("agent-1", "Negamax", chess::PieceColor::White, 1).await.unwrap_err();
        assert!(matches!(err, SessionManagerError::SessionLimit));
    }

    #[tokio::test]
    async fn global_session_limit_is_enforced() {
        let manager = manager(10, 1);
        manager.create("agent-1", "Negamax", chess::PieceColor::White, 1).await.unwrap();
        let err = manager.create("agent-2", "Negamax", chess::PieceColor::White, 1).await.unwrap_err();
        assert!(matches!(err, SessionManagerError::SessionLimit));
    }

    #[tokio::test]
    async fn end_releases_both_indexes() {
        let manager = manager(10, 1000);
        let snapshot = manager.create("agent-1", "Negamax", chess::PieceColor::White, 1).await.unwrap();
        manager.end(&snapshot.session_id).await.unwrap();
        assert!(manager.get(&snapshot.session_id).await.is_none());
        assert!(manager.agent_sessions("agent-1").await.is_empty());
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_owning_agent() {
        let manager = manager(10, 1000);
        let snapshot = manager.create("agent-a", "Negamax", chess::PieceColor::White, 1).await.unwrap();
        let handle = manager.get(&snapshot.session_id).await.unwrap();
        assert_eq!(handle.owner(), "agent-a");
        assert!(!manager.agent_sessions("agent-b").await.contains(&snapshot.session_id));
    }
}
