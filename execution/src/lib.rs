//! Suitwatch execution layer.
//!
//! This crate contains the deterministic prediction state machine used by the node:
//! parsing finalized feed messages, deriving a "missing suit" prediction, queueing and
//! promoting predictions under a concurrency cap, and resolving them with the two-chance
//! protocol.
//!
//! ## Determinism requirements
//! - Do not read the wall clock inside execution; timestamps are passed in by the caller.
//! - Do not perform I/O. Every outbound action is returned as an [`Effect`] for the node to
//!   execute, in order.
//! - Iterate collections in target-game order so outputs never depend on hash order.
//!
//! The primary entrypoint is [`Engine`].
//!
//! ## Minimal pipeline (example)
//! ```rust
//! use suitwatch_execution::{Engine, EngineConfig, Ingest};
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! let outcome = engine.ingest("✅ #N100. 5(♠️♥️♦️) - 7(K♠)", 0);
//! assert!(matches!(outcome, Ingest::Processed { game: 100, .. }));
//! ```

pub mod cache;
pub mod engine;
pub mod feed;
mod promotion;
mod resolution;
pub mod reset;
pub mod rule;
pub mod store;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

#[cfg(test)]
mod pipeline_tests;
#[cfg(test)]
mod store_proptests;

pub use cache::{BoundedSet, RecentGame, RecentGames};
pub use engine::{Effect, Engine, EngineConfig, Ingest, SkipReason, StatusSnapshot};
pub use promotion::{Promotion, PromotionReport};
pub use reset::{DailySchedule, ResetScope, ScheduleError};
pub use resolution::{BackupOutcome, Resolved};
pub use rule::{Derived, RuleEngine, RulePolicy};
pub use store::{Store, StoreConfig};
