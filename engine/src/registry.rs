//! `EngineRegistry` — the fixed catalogue of named engines and the worker
//! pool each belongs to (spec §4.3).
//!
//! Engines are grouped into three classes, each backed by its own bounded
//! worker pool in [`crate::dispatcher::EngineDispatcher`]: `neural` (4
//! workers), `classical` (8 workers), `learned` (6 workers).

use std::collections::HashMap;
use std::sync::Arc;

use crate::engines::{HeuristicEngine, Strategy};
use crate::ChessEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineClass {
    Neural,
    Classical,
    Learned,
}

impl EngineClass {
    /// Worker pool size for this class, per spec §4.4.
    pub fn pool_size(self) -> usize {
        match self {
            EngineClass::Neural => 4,
            EngineClass::Classical => 8,
            EngineClass::Learned => 6,
        }
    }
}

/// Immutable catalogue of the twelve named engines, keyed by name.
pub struct EngineRegistry {
    engines: HashMap<&'static str, Arc<dyn ChessEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        let entries: Vec<(&'static str, EngineClass, Strategy)> = vec![
            ("AlphaZero", EngineClass::Neural, Strategy::Negamax),
            ("LeelaChessZero", EngineClass::Neural, Strategy::Negamax),
            ("AlphaFold3", EngineClass::Neural, Strategy::Negamax),
            ("A3C", EngineClass::Neural, Strategy::RandomRollout { rollouts: 32 }),
            ("MCTS", EngineClass::Classical, Strategy::RandomRollout { rollouts: 64 }),
            ("Negamax", EngineClass::Classical, Strategy::Negamax),
            ("OpenAI", EngineClass::Classical, Strategy::Negamax),
            ("QLearning", EngineClass::Learned, Strategy::RandomRollout { rollouts: 48 }),
            ("DeepLearning", EngineClass::Learned, Strategy::Negamax),
            ("CNN", EngineClass::Learned, Strategy::Negamax),
            ("DQN", EngineClass::Learned, Strategy::RandomRollout { rollouts: 48 }),
            ("Genetic", EngineClass::Learned, Strategy::GreedyCapture),
        ];

        let engines = entries
            .into_iter()
            .map(|(name, class, strategy)| {
                let engine: Arc<dyn ChessEngine> = Arc::new(HeuristicEngine::new(name, class, strategy));
                (name, engine)
            })
            .collect();

        Self { engines }
    }

    /// Case-insensitive lookup, per spec §4.3 ("engine name (case-insensitive)").
    pub fn get(&self, name: &str) -> Option<Arc<dyn ChessEngine>> {
        self.engines
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, engine)| engine.clone())
    }

    pub fn class_of(&self, name: &str) -> Option<EngineClass> {
        self.get(name).map(|e| e.class())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.engines.keys().copied()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_named_engine_is_registered() {
        let registry = EngineRegistry::new();
        for name in crate::ENGINE_NAMES {
            assert!(registry.get(name).is_some(), "missing engine {name}");
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = EngineRegistry::new();
        assert!(registry.get("negamax").is_some());
        assert!(registry.get("NEGAMAX").is_some());
        assert!(registry.get("NotAnEngine").is_none());
    }

    #[test]
    fn class_of_is_case_insensitive() {
        let registry = EngineRegistry::new();
        assert_eq!(registry.class_of("negamax"), registry.class_of("NEGAMAX"));
        assert!(registry.class_of("negamax").is_some());
    }

    #[test]
    fn pool_sizes_match_the_spec() {
        assert_eq!(EngineClass::Neural.pool_size(), 4);
        assert_eq!(EngineClass::Classical.pool_size(), 8);
        assert_eq!(EngineClass::Learned.pool_size(), 6);
    }
}
