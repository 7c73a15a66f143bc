//! `AgentRegistry` — agent identity, activity tracking, TTL cleanup
//! (spec §3, §4.6, §5).
//!
//! Backed by `dashmap` rather than a `RwLock<HashMap<_>>`: agent lookups
//! happen on every request, and a concurrent map avoids serializing all of
//! them behind one lock the way the session index below intentionally
//! does (sessions mutate far less often than agents are looked up).

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportTag {
    Stdio,
    WebSocket,
}

#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// An agent's identity and activity bookkeeping. `last_activity` is an
/// atomic so `touch()` can be called from any request handler without
/// taking a write lock on the whole registry.
pub struct Agent {
    pub agent_id: String,
    pub client_info: ClientInfo,
    pub transport: TransportTag,
    pub registered_at: i64,
    last_activity: AtomicI64,
}

impl Agent {
    pub fn last_activity(&self) -> i64 {
        self.last_activity.load(Ordering::Relaxed)
    }

    pub fn touch(&self) {
        self.last_activity.store(now(), Ordering::Relaxed);
    }

    pub fn idle_for(&self) -> Duration {
        let elapsed = now() - self.last_activity();
        Duration::from_secs(elapsed.max(0) as u64)
    }
}

fn now() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
}

/// 8-character lowercase hex nonce, per spec §4.7's `agent-<8-char-nonce>`
/// and §3's `chess-session-<agentId>-<8-char-nonce>` id formats.
pub fn short_nonce() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(30 * 60);

pub struct AgentRegistry {
    agents: DashMap<String, Agent>,
    max_agents: usize,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AgentError {
    #[error("maximum concurrent agents reached")]
    CapacityReached,
}

impl AgentRegistry {
    pub fn new(max_agents: usize) -> Self {
        Self { agents: DashMap::new(), max_agents }
    }

    /// Look up an existing agent (touching its activity clock), or
    /// register a brand-new one under a server-assigned id.
    pub fn register_or_touch(
        &self,
        existing_agent_id: Option<&str>,
        client_info: ClientInfo,
        transport: TransportTag,
    ) -> Result<String, AgentError> {
        if let Some(id) = existing_agent_id {
            if let Some(agent) = self.agents.get(id) {
                agent.touch();
                return Ok(id.to_string());
            }
        }

        if self.agents.len() >= self.max_agents {
            return Err(AgentError::CapacityReached);
        }

        let agent_id = format!("agent-{}", short_nonce());
        let timestamp = now();
        self.agents.insert(
            agent_id.clone(),
            Agent {
                agent_id: agent_id.clone(),
                client_info,
                transport,
                registered_at: timestamp,
                last_activity: AtomicI64::new(timestamp),
            },
        );
        Ok(agent_id)
    }

    pub fn touch(&self, agent_id: &str) {
        if let Some(agent) = self.agents.get(agent_id) {
            agent.touch();
        }
    }

    /// Records the `clientInfo` an `initialize` call reports, once the
    /// agent has already been provisionally registered by its transport.
    pub fn update_client_info(&self, agent_id: &str, client_info: ClientInfo) {
        if let Some(mut agent) = self.agents.get_mut(agent_id) {
            agent.client_info = client_info;
            agent.touch();
        }
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.agents.contains_key(agent_id)
    }

    pub fn remove(&self, agent_id: &str) {
        self.agents.remove(agent_id);
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agent ids idle past the 30-minute inactivity window, per spec §3.
    pub fn expired_agents(&self) -> Vec<String> {
        self.agents
            .iter()
            .filter(|entry| entry.idle_for() >= INACTIVITY_TIMEOUT)
            .map(|entry| entry.agent_id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_info() -> ClientInfo {
        ClientInfo { name: "test".to_string(), version: "1".to_string() }
    }

    #[test]
    fn registers_a_new_agent_and_reuses_it() {
        let registry = AgentRegistry::new(10);
        let id = registry.register_or_touch(None, client_info(), TransportTag::Stdio).unwrap();
        assert!(registry.contains(&id));

        let reused = registry.register_or_touch(Some(&id), client_info(), TransportTag::Stdio).unwrap();
        assert_eq!(id, reused);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rejects_registration_past_capacity() {
        let registry = AgentRegistry::new(1);
        registry.register_or_touch(None, client_info(), TransportTag::Stdio).unwrap();
        let err = registry.register_or_touch(None, client_info(), TransportTag::Stdio).unwrap_err();
        assert!(matches!(err, AgentError::CapacityReached));
    }

    #[test]
    fn fresh_agents_are_not_expired() {
        let registry = AgentRegistry::new(10);
        let id = registry.register_or_touch(None, client_info(), TransportTag::Stdio).unwrap();
        assert!(registry.expired_agents().is_empty());
        let _ = id;
    }

    #[test]
    fn update_client_info_overwrites_the_provisional_record() {
        let registry = AgentRegistry::new(10);
        let id = registry.register_or_touch(None, client_info(), TransportTag::Stdio).unwrap();
        registry.update_client_info(&id, ClientInfo { name: "real-client".to_string(), version: "2".to_string() });
        let agent = registry.agents.get(&id).unwrap();
        assert_eq!(agent.client_info.name, "real-client");
    }
}
