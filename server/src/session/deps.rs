//! `SessionDeps` — the capability struct every session actor is
//! constructed with, per spec §9's "eliminate the Java static-singleton
//! pattern" design note.
//!
//! A `Session` never reaches into global state: `SessionManager` hands it
//! one `SessionDeps` at spawn time, cloned cheaply (every field is an
//! `Arc`). `RuleEvaluator` itself carries no fields worth passing through
//! here — every operation on it is a stateless associated function — so
//! only the two components with real runtime state are included.

use std::sync::Arc;

use engine::EngineDispatcher;

use crate::notify::NotificationBus;

#[derive(Clone)]
pub struct SessionDeps {
    pub engine_dispatcher: Arc<EngineDispatcher>,
    pub notification_bus: Arc<NotificationBus>,
}
