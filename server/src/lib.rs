//! The Chess MCP server: agent/session bookkeeping, rate limiting,
//! notification fan-out, the optional ratchet-encryption overlay, and the
//! JSON-RPC tool/resource surface built on top of them.

pub mod agent;
pub mod config;
pub mod notify;
pub mod rate_limit;
pub mod ratchet;
pub mod resources;
pub mod router;
pub mod session;
pub mod tools;
pub mod transport;

use std::sync::Arc;

use agent::AgentRegistry;
use config::ServerConfig;
use engine::{EngineDispatcher, EngineRegistry};
use notify::NotificationBus;
use rate_limit::RateLimiter;
use ratchet::RatchetService;
use session::SessionManager;

/// Every shared component a request handler might need, constructed once at
/// startup and handed to `RpcRouter`/transports behind an `Arc`.
pub struct AppState {
    pub config: ServerConfig,
    pub agents: AgentRegistry,
    pub sessions: SessionManager,
    pub engine_registry: Arc<EngineRegistry>,
    pub rate_limiter: RateLimiter,
    pub notifications: Arc<NotificationBus>,
    pub ratchet: Option<RatchetService>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let engine_registry = Arc::new(EngineRegistry::new());
        let engine_dispatcher = Arc::new(EngineDispatcher::new(engine_registry.clone()));
        let notifications = Arc::new(NotificationBus::new());

        let ratchet = config.encryption_enabled.then(|| RatchetService::new(config.encryption_session_timeout));

        Arc::new(Self {
            agents: AgentRegistry::new(config.max_agents),
            sessions: SessionManager::new(
                engine_registry.clone(),
                engine_dispatcher,
                notifications.clone(),
                config.max_sessions_per_agent,
                config.max_total_sessions,
            ),
            engine_registry,
            rate_limiter: RateLimiter::new(
                config.rate_limit_general_per_min,
                config.rate_limit_moves_per_min,
                config.rate_limit_burst_per_10s,
            ),
            notifications,
            ratchet,
            config,
        })
    }

    /// One sweep pass: expired agents release their sessions, ratchet
    /// state, and registry entry; rate-limiter buckets are compacted.
    /// Intended to run on `main`'s 5-minute scheduler tick (spec §4.7/§5).
    pub async fn sweep(&self) {
        for agent_id in self.agents.expired_agents() {
            self.cleanup_agent(&agent_id).await;
            tracing::info!(agent_id, "agent expired and was cleaned up");
        }
        self.rate_limiter.sweep();
        if let Some(ratchet) = &self.ratchet {
            ratchet.sweep();
        }
    }

    /// Tear down everything an agent owns: its sessions (any in-flight
    /// engine search is left to finish but its result is discarded once the
    /// session is gone, per spec §5), its notification queue, and its
    /// ratchet keys, then drop the agent itself. Shared by the idle-timeout
    /// sweep above and by a transport's eager cleanup on disconnect (spec
    /// §5/§7's `TransportClosed`), so the two triggers can never diverge.
    pub async fn cleanup_agent(&self, agent_id: &str) {
        self.sessions.end_all_for_agent(agent_id).await;
        self.notifications.unsubscribe(agent_id);
        if let Some(ratchet) = &self.ratchet {
            ratchet.destroy(agent_id);
        }
        self.agents.remove(agent_id);
    }
}
