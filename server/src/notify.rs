//! `NotificationBus` — per-agent asynchronous event delivery (spec §4.9).
//!
//! Each agent gets one bounded, drop-oldest queue; publishing is
//! best-effort — if the agent has no active transport consuming the
//! queue, or the queue is saturated, the oldest queued notification is
//! evicted to make room. A single queue per agent, guarded by one mutex,
//! gives ordering per (agent, method) for free regardless of how many
//! session actors publish into it concurrently.

use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;
use mcp_proto::JsonRpcNotification;
use serde_json::Value;
use tokio::sync::Notify;
use tokio::sync::Mutex as AsyncMutex;

const QUEUE_CAPACITY: usize = 256;

struct AgentQueue {
    notifications: AsyncMutex<VecDeque<JsonRpcNotification>>,
    signal: Notify,
}

impl AgentQueue {
    fn new() -> Self {
        Self { notifications: AsyncMutex::new(VecDeque::new()), signal: Notify::new() }
    }

    async fn push(&self, notification: JsonRpcNotification) {
        let mut queue = self.notifications.lock().await;
        if queue.len() >= QUEUE_CAPACITY {
            queue.pop_front();
        }
        queue.push_back(notification);
        drop(queue);
        self.signal.notify_one();
    }

    async fn pop(&self) -> JsonRpcNotification {
        loop {
            {
                let mut queue = self.notifications.lock().await;
                if let Some(notification) = queue.pop_front() {
                    return notification;
                }
            }
            self.signal.notified().await;
        }
    }
}

pub struct NotificationBus {
    agents: DashMap<String, Arc<AgentQueue>>,
}

/// Handle a transport holds to drain one agent's notification queue.
pub struct NotificationReceiver {
    queue: Arc<AgentQueue>,
}

impl NotificationReceiver {
    pub async fn recv(&self) -> JsonRpcNotification {
        self.queue.pop().await
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        Self { agents: DashMap::new() }
    }

    /// Register (or re-register, e.g. on reconnect) a listener for an agent.
    pub fn subscribe(&self, agent_id: &str) -> NotificationReceiver {
        let queue = self.agents.entry(agent_id.to_string()).or_insert_with(|| Arc::new(AgentQueue::new())).clone();
        NotificationReceiver { queue }
    }

    pub fn unsubscribe(&self, agent_id: &str) {
        self.agents.remove(agent_id);
    }

    /// Best-effort, at-most-once delivery; silently dropped if the agent
    /// has never subscribed.
    pub async fn publish(&self, agent_id: &str, method: &str, params: Value) {
        let Some(queue) = self.agents.get(agent_id).map(|q| q.clone()) else { return };
        queue.push(JsonRpcNotification::new(method, params)).await;
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn delivers_published_notifications_in_order() {
        let bus = NotificationBus::new();
        let rx = bus.subscribe("agent-1");
        bus.publish("agent-1", "notifications/chess/ai_move", json!({"sessionId": "s"})).await;
        bus.publish("agent-1", "notifications/chess/game_state", json!({"sessionId": "s"})).await;

        let first = rx.recv().await;
        let second = rx.recv().await;
        assert_eq!(first.method, "notifications/chess/ai_move");
        assert_eq!(second.method, "notifications/chess/game_state");
    }

    #[tokio::test]
    async fn publishing_with_no_listener_is_a_silent_no_op() {
        let bus = NotificationBus::new();
        bus.publish("ghost", "notifications/chess/ai_move", json!({})).await;
    }

    #[tokio::test]
    async fn saturated_queue_drops_the_oldest_entry() {
        let bus = NotificationBus::new();
        let rx = bus.subscribe("agent-1");
        for i in 0..(QUEUE_CAPACITY + 1) {
            bus.publish("agent-1", "notifications/chess/game_state", json!({ "n": i })).await;
        }
        let first = rx.recv().await;
        assert_eq!(first.params["n"], 1);
    }
}
