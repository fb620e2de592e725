//! # Glossa Core
//!
//! Spaced-repetition engine for language learning:
//!
//! - **FSRS scheduling**: power forgetting curve with stability/difficulty
//!   state, per-rating intervals, and configurable target retention
//! - **Adaptive queues**: due and new cards interleaved per session, with
//!   new-card introduction tied to review volume and recent performance
//! - **Session orchestration**: a cursor-driven state machine that assesses
//!   answers, applies the memory model atomically, and tracks per-session
//!   learner signals
//! - **Narrow collaborator seams**: persistence, exercise selection, and
//!   response assessment all live behind traits
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use glossa_core::prelude::*;
//!
//! let store = Arc::new(SqliteCardStore::new(None)?);
//! let registry = SessionRegistry::new(7200);
//!
//! let start = registry.start(
//!     store,
//!     Box::new(exercises),
//!     Box::new(ExactAssessor::new()),
//!     SessionContext::new("learner-1", chrono::Utc::now()),
//!     &EngineConfig::default(),
//!     chrono::Utc::now(),
//! )?;
//!
//! let next = registry.with_session(&start.session_id, |s| s.get_next())?;
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod assess;
pub mod card;
pub mod config;
pub mod exercise;
pub mod fsrs;
pub mod policy;
pub mod queue;
pub mod session;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// FSRS memory model
pub use fsrs::{
    initial_difficulty,
    initial_stability,
    next_difficulty,
    next_forget_stability,
    next_recall_stability,
    // Core functions for advanced usage
    retrievability,
    stability_to_interval,
    CardState,
    FsrsError,
    FsrsParameters,
    FsrsScheduler,
    Rating,
    ReviewResult,
    DEFAULT_RETENTION,
    // Constants
    FSRS_WEIGHTS,
    MAX_DIFFICULTY,
    MIN_DIFFICULTY,
    MIN_STABILITY,
};

// Cards and the review audit log
pub use card::{Card, ReviewOutcome};

// Queue construction
pub use queue::{build_queue, QueueConfig, ReviewQueue};

// Adaptive policy
pub use policy::{AdaptivePolicy, LimitDecision, TierDecision};

// Exercises
pub use exercise::{
    DifficultyTier, Exercise, ExerciseKind, ExerciseSource, PooledExerciseSource,
};

// Assessment
pub use assess::{
    normalize_for_comparison, AssessError, Assessment, Assessor, ExactAssessor, Grade,
};

// Sessions
pub use session::{
    start_session, AnswerOutcome, AnswerSubmission, ReviewEvent, ReviewSession, SessionCard,
    SessionContext, SessionError, SessionRegistry, SessionStart, SessionStats, SessionSummary,
};

// Storage layer
pub use storage::{CardStore, Result, SqliteCardStore, StorageError};

// Configuration
pub use config::EngineConfig;

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        AdaptivePolicy, AnswerOutcome, AnswerSubmission, Card, CardState, CardStore, EngineConfig,
        ExactAssessor, Exercise, ExerciseKind, ExerciseSource, FsrsParameters, FsrsScheduler,
        Grade, PooledExerciseSource, Rating, Result, ReviewOutcome, ReviewQueue, ReviewSession,
        SessionContext, SessionError, SessionRegistry, SessionStart, SessionSummary,
        SqliteCardStore, StorageError,
    };
}
