//! # Replay
//!
//! The orchestrator: drives the merged log view through the dispatch
//! router, gates output rows on estimator readiness, accounts
//! processing time, and emits periodic resource rows.

pub mod engine;
pub mod stats;

pub use dispatcher::RouterConfig;
pub use engine::{EngineConfig, ReplayEngine};
pub use stats::ReplayStats;
