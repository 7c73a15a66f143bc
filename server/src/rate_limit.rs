//! `RateLimiter` — per-agent sliding-window admission control (spec §4.8).
//!
//! A real wall-clock-bucket limiter (minute buckets, as the distilled
//! prototype this was drawn from used) under- or over-counts at bucket
//! boundaries. A sliding window over raw per-agent timestamps, compacted
//! on every admit, is simpler to reason about and matches the spec's
//! "≤ N in any W-second window" wording exactly.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::DashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodClass {
    Burst,
    Move,
    General,
}

struct Window {
    limit: u32,
    period: Duration,
    events: Mutex<VecDeque<Instant>>,
}

impl Window {
    fn new(limit: u32, period: Duration) -> Self {
        Self { limit, period, events: Mutex::new(VecDeque::new()) }
    }

    fn admit(&self, now: Instant) -> bool {
        let mut events = self.events.lock().expect("rate limiter window mutex poisoned");
        while let Some(&front) = events.front() {
            if now.duration_since(front) > self.period {
                events.pop_front();
            } else {
                break;
            }
        }
        if events.len() as u32 >= self.limit {
            return false;
        }
        events.push_back(now);
        true
    }

    fn oldest_within(&self, now: Instant) -> Option<Instant> {
        let events = self.events.lock().expect("rate limiter window mutex poisoned");
        events.front().copied().filter(|&t| now.duration_since(t) <= self.period)
    }
}

struct AgentBuckets {
    burst: Window,
    moves: Window,
    general: Window,
}

pub struct RateLimiter {
    general_per_min: u32,
    moves_per_min: u32,
    burst_per_10s: u32,
    buckets: DashMap<String, AgentBuckets>,
}

impl RateLimiter {
    pub fn new(general_per_min: u32, moves_per_min: u32, burst_per_10s: u32) -> Self {
        Self { general_per_min, moves_per_min, burst_per_10s, buckets: DashMap::new() }
    }

    /// Every request is checked against the burst and general windows;
    /// `make_chess_move` calls are additionally checked against the move
    /// window. All three must admit for the request to proceed.
    pub fn admit(&self, agent_id: &str, class: MethodClass) -> bool {
        let now = Instant::now();
        let buckets = self.buckets.entry(agent_id.to_string()).or_insert_with(|| AgentBuckets {
            burst: Window::new(self.burst_per_10s, Duration::from_secs(10)),
            moves: Window::new(self.moves_per_min, Duration::from_secs(60)),
            general: Window::new(self.general_per_min, Duration::from_secs(60)),
        });

        if !buckets.burst.admit(now) {
            return false;
        }
        if !buckets.general.admit(now) {
            return false;
        }
        if class == MethodClass::Move && !buckets.moves.admit(now) {
            return false;
        }
        true
    }

    /// Drop any agent whose buckets have been empty long enough that the
    /// largest window (the 60s ones) could not possibly still hold
    /// entries, per spec §4.8.
    pub fn sweep(&self) {
        let now = Instant::now();
        self.buckets.retain(|_, buckets| {
            buckets.burst.oldest_within(now).is_some()
                || buckets.moves.oldest_within(now).is_some()
                || buckets.general.oldest_within(now).is_some()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_the_burst_limit_then_denies() {
        let limiter = RateLimiter::new(1000, 1000, 10);
        for _ in 0..10 {
            assert!(limiter.admit("a", MethodClass::General));
        }
        assert!(!limiter.admit("a", MethodClass::General));
    }

    #[test]
    fn move_window_is_independent_per_agent() {
        let limiter = RateLimiter::new(1000, 2, 1000);
        assert!(limiter.admit("a", MethodClass::Move));
        assert!(limiter.admit("a", MethodClass::Move));
        assert!(!limiter.admit("a", MethodClass::Move));
        assert!(limiter.admit("b", MethodClass::Move));
    }

    #[test]
    fn sweep_does_not_panic_on_empty_registry() {
        let limiter = RateLimiter::new(100, 60, 10);
        limiter.sweep();
    }
}
