//! `SessionHandle` — the cheap, cloneable front-end other components use
//! to talk to a session actor (spec §4.5).

use tokio::sync::{mpsc, oneshot};

use super::commands::{AnalysisResult, MoveResult, SessionCommand, SessionError};
use super::snapshot::SessionSnapshot;

#[derive(Clone)]
pub struct SessionHandle {
    agent_id: String,
    cmd_tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub(crate) fn new(agent_id: String, cmd_tx: mpsc::Sender<SessionCommand>) -> Self {
        Self { agent_id, cmd_tx }
    }

    /// The agent that owns this session — checked by `SessionManager`
    /// before any cross-agent access, per spec §4.11's `Unauthorized`.
    pub fn owner(&self) -> &str {
        &self.agent_id
    }

    pub async fn make_move(&self, uci: String) -> Result<MoveResult, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::MakeMove { uci, reply: tx }).await?;
        rx.await.map_err(|_| SessionError::Internal("session actor reply dropped".into()))?
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::GetSnapshot { reply: tx }).await?;
        rx.await.map_err(|_| SessionError::Internal("session actor reply dropped".into()))
    }

    pub async fn legal_moves(&self) -> Result<Vec<String>, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::GetLegalMoves { reply: tx }).await?;
        rx.await.map_err(|_| SessionError::Internal("session actor reply dropped".into()))
    }

    pub async fn analyze(&self, depth: Option<u8>) -> Result<AnalysisResult, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Analyze { depth, reply: tx }).await?;
        rx.await.map_err(|_| SessionError::Internal("session actor reply dropped".into()))?
    }

    pub async fn hint(&self, hint_level: Option<u8>) -> Result<AnalysisResult, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Hint { hint_level, reply: tx }).await?;
        rx.await.map_err(|_| SessionError::Internal("session actor reply dropped".into()))?
    }

    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(SessionCommand::Shutdown).await;
    }

    async fn send(&self, cmd: SessionCommand) -> Result<(), SessionError> {
        self.cmd_tx.send(cmd).await.map_err(|_| SessionError::Internal("session actor closed".into()))
    }
}
