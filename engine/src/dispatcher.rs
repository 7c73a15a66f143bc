//! `EngineDispatcher` — routes a search request to its engine's worker
//! pool, bounds it by the difficulty-derived deadline, and tracks
//! per-engine load (spec §4.4).
//!
//! Pools are realized as `tokio::sync::Semaphore`s rather than OS thread
//! pools: a permit bounds *concurrent searches*, while the actual CPU-bound
//! work runs on the blocking thread pool via `spawn_blocking` so it never
//! stalls the async runtime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chess::{Board, Move};
use dashmap::DashMap;
use tokio::sync::Semaphore;

use crate::registry::{EngineClass, EngineRegistry};
use crate::{deadline_for_difficulty, EngineError};

#[derive(Debug, Default)]
struct Counters {
    active: AtomicU64,
    completed: AtomicU64,
    timed_out: AtomicU64,
}

/// Snapshot of one engine's current load, for diagnostics/resource
/// introspection.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineLoad {
    pub active: u64,
    pub completed: u64,
    pub timed_out: u64,
}

pub struct EngineDispatcher {
    registry: Arc<EngineRegistry>,
    neural: Arc<Semaphore>,
    classical: Arc<Semaphore>,
    learned: Arc<Semaphore>,
    counters: DashMap<&'static str, Arc<Counters>>,
}

impl EngineDispatcher {
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        let counters = DashMap::new();
        for name in registry.names() {
            counters.insert(name, Arc::new(Counters::default()));
        }

        Self {
            registry,
            neural: Arc::new(Semaphore::new(EngineClass::Neural.pool_size())),
            classical: Arc::new(Semaphore::new(EngineClass::Classical.pool_size())),
            learned: Arc::new(Semaphore::new(EngineClass::Learned.pool_size())),
            counters,
        }
    }

    fn pool_for(&self, class: EngineClass) -> Arc<Semaphore> {
        match class {
            EngineClass::Neural => self.neural.clone(),
            EngineClass::Classical => self.classical.clone(),
            EngineClass::Learned => self.learned.clone(),
        }
    }

    pub fn load_of(&self, name: &str) -> Option<EngineLoad> {
        self.counters.get(name).map(|c| EngineLoad {
            active: c.active.load(Ordering::Relaxed),
            completed: c.completed.load(Ordering::Relaxed),
            timed_out: c.timed_out.load(Ordering::Relaxed),
        })
    }

    /// Dispatch a search to the named engine, waiting for a free slot in
    /// its class's pool, then running it under the difficulty's deadline.
    pub async fn dispatch(&self, name: &str, board: Board, difficulty: u8) -> Result<Move, EngineError> {
        let engine = self
            .registry
            .get(name)
            .ok_or_else(|| EngineError::UnknownEngine(name.to_string()))?;
        // counters are keyed by canonical casing; `name` may differ (lookup
        // is case-insensitive per spec §4.3).
        let counters = self
            .counters
            .get(engine.name())
            .map(|c| c.value().clone())
            .ok_or_else(|| EngineError::UnknownEngine(name.to_string()))?;

        let pool = self.pool_for(engine.class());
        let _permit = pool
            .acquire_owned()
            .await
            .map_err(|e| EngineError::Internal(e.to_string()))?;

        counters.active.fetch_add(1, Ordering::Relaxed);
        let budget = deadline_for_difficulty(difficulty);
        let deadline = Instant::now() + budget;

        let search = tokio::task::spawn_blocking(move || engine.search(&board, difficulty, deadline));
        let outcome = tokio::time::timeout(budget, search).await;

        counters.active.fetch_sub(1, Ordering::Relaxed);

        match outcome {
            Ok(Ok(result)) => {
                counters.completed.fetch_add(1, Ordering::Relaxed);
                result
            }
            Ok(Err(join_error)) => Err(EngineError::Internal(join_error.to_string())),
            Err(_elapsed) => {
                counters.timed_out.fetch_add(1, Ordering::Relaxed);
                Err(EngineError::Timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::GameState;

    #[tokio::test]
    async fn dispatches_to_a_known_engine() {
        let dispatcher = EngineDispatcher::new(Arc::new(EngineRegistry::new()));
        let board = GameState::new().board().clone();
        let mv = dispatcher.dispatch("Negamax", board, 2).await.unwrap();
        assert!(mv.from != mv.to);
    }

    #[tokio::test]
    async fn dispatch_is_case_insensitive_and_shares_counters() {
        let dispatcher = EngineDispatcher::new(Arc::new(EngineRegistry::new()));
        let board = GameState::new().board().clone();
        dispatcher.dispatch("negamax", board.clone(), 2).await.unwrap();
        dispatcher.dispatch("NEGAMAX", board, 2).await.unwrap();
        assert_eq!(dispatcher.load_of("Negamax").unwrap().completed, 2);
    }

    #[tokio::test]
    async fn unknown_engine_is_rejected() {
        let dispatcher = EngineDispatcher::new(Arc::new(EngineRegistry::new()));
        let board = GameState::new().board().clone();
        let err = dispatcher.dispatch("NotAnEngine", board, 2).await.unwrap_err();
        assert!(matches!(err, EngineError::UnknownEngine(_)));
    }

    #[tokio::test]
    async fn load_counters_reflect_completed_searches() {
        let dispatcher = EngineDispatcher::new(Arc::new(EngineRegistry::new()));
        let board = GameState::new().board().clone();
        dispatcher.dispatch("Genetic", board, 1).await.unwrap();
        let load = dispatcher.load_of("Genetic").unwrap();
        assert_eq!(load.active, 0);
        assert_eq!(load.completed, 1);
    }
}
