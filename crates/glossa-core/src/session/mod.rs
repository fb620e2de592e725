//! Review sessions
//!
//! The session state machine, its learner context, the id-keyed registry
//! with TTL eviction, and the `start_session` entry point that wires the
//! adaptive policy, queue builder, and scheduler together.

mod context;
mod machine;
mod registry;

pub use context::{ReviewEvent, SessionContext};
pub use machine::{
    AnswerOutcome, AnswerSubmission, ReviewSession, SessionCard, SessionError, SessionStats,
    SessionSummary,
};
pub use registry::SessionRegistry;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assess::Assessor;
use crate::config::EngineConfig;
use crate::exercise::ExerciseSource;
use crate::fsrs::FsrsScheduler;
use crate::policy::AdaptivePolicy;
use crate::queue::{build_queue, QueueConfig};
use crate::storage::CardStore;

// ============================================================================
// SESSION START
// ============================================================================

/// What a caller gets back when a session starts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStart {
    /// The new session's id
    pub session_id: String,
    /// Due cards queued
    pub due_cards: usize,
    /// New cards queued
    pub new_cards: usize,
    /// Total cards queued
    pub total: usize,
    /// Why the policy chose this session's limits
    pub reasoning: String,
}

/// Start a review session for a learner.
///
/// Evaluates the adaptive policy against the supplied context (fresh for a
/// first session, carried over when the caller tracks cross-session
/// signals), builds the queue with the adapted limits, and assembles the
/// state machine.
pub fn start_session(
    store: Arc<dyn CardStore>,
    exercises: Box<dyn ExerciseSource>,
    assessor: Box<dyn Assessor>,
    ctx: SessionContext,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<ReviewSession, SessionError> {
    let policy = AdaptivePolicy::new(config);
    let decision = policy.session_limits(&ctx);
    let queue_config = QueueConfig {
        max_reviews: decision.review_limit,
        max_new: decision.new_limit,
        new_card_ratio: config.new_card_ratio,
    };
    let learner_id = ctx.learner_id.clone();
    let queue = build_queue(store.as_ref(), &learner_id, &queue_config, now)?;

    tracing::info!(
        learner_id = %learner_id,
        total = queue.total,
        reasoning = %decision.reasoning,
        "Started session"
    );

    Ok(ReviewSession::new(
        learner_id,
        queue,
        FsrsScheduler::with_target_retention(config.target_retention),
        policy,
        decision,
        ctx,
        store,
        exercises,
        assessor,
        now,
    ))
}

impl SessionRegistry {
    /// Start a session and register it, returning the start payload the
    /// serving layer exposes (session id plus queue counts).
    pub fn start(
        &self,
        store: Arc<dyn CardStore>,
        exercises: Box<dyn ExerciseSource>,
        assessor: Box<dyn Assessor>,
        ctx: SessionContext,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Result<SessionStart, SessionError> {
        let session = start_session(store, exercises, assessor, ctx, config, now)?;
        let due_cards = session.queue().due_cards.len();
        let new_cards = session.queue().new_cards.len();
        let total = session.queue().total;
        let reasoning = session.decision().reasoning.clone();
        let session_id = self.insert(session);
        Ok(SessionStart {
            session_id,
            due_cards,
            new_cards,
            total,
            reasoning,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
