//! Review session state machine
//!
//! Sequences the interleaved card queue, applies the memory model on every
//! answer, and keeps the per-session statistics and learner context. A
//! session moves from active to complete as the cursor crosses the card
//! list; there are no backward transitions.
//!
//! Each `submit_answer` is atomic from the caller's point of view: the
//! whole transition (card write, log append, counters, cursor advance)
//! happens only after persistence succeeds, so a failed write leaves the
//! session exactly where it was.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assess::{AssessError, Assessment, Assessor, Grade};
use crate::card::{Card, ReviewOutcome};
use crate::exercise::{Exercise, ExerciseSource};
use crate::fsrs::{FsrsError, FsrsScheduler, Rating, ReviewResult};
use crate::policy::{AdaptivePolicy, LimitDecision};
use crate::queue::ReviewQueue;
use crate::session::context::{ReviewEvent, SessionContext};
use crate::storage::{CardStore, StorageError};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Session error type
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Caller input rejected before any state mutation
    #[error("Invalid input: {0}")]
    Validation(String),
    /// The submitted card/exercise identity does not match what was presented
    #[error("Submitted identity {submitted} does not match presented {presented}")]
    IdentityMismatch {
        /// What the session last presented
        presented: String,
        /// What the caller submitted
        submitted: String,
    },
    /// An answer arrived with no card currently presented
    #[error("No card is currently presented")]
    NothingPresented,
    /// Unknown or evicted session id
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    /// Persistence failure, propagated without retry
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Assessment collaborator failure
    #[error(transparent)]
    Assessment(#[from] AssessError),
    /// Memory-model input error
    #[error(transparent)]
    Fsrs(#[from] FsrsError),
}

// ============================================================================
// DATA TYPES
// ============================================================================

/// A card presented during a session, with its selected exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCard {
    /// The card up for review
    pub card: Card,
    /// The exercise chosen for it
    pub exercise: Exercise,
}

/// An answer submitted for the currently presented card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    /// Card the caller believes it is answering
    pub card_id: String,
    /// Exercise the caller believes it is answering
    pub exercise_id: String,
    /// The learner's response
    pub response: String,
    /// Response time in milliseconds
    pub time_ms: i64,
    /// Optional explicit self-rating (1-4); wins over the assessor's
    /// suggestion when present
    pub self_rating: Option<i32>,
}

/// The result of one submitted answer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    /// How the response was assessed
    pub assessment: Assessment,
    /// The rating actually applied to the card
    pub applied_rating: Rating,
    /// The memory-model result (new state, interval, retrievability)
    pub review: ReviewResult,
    /// Cards left in the session
    pub remaining: usize,
    /// Whether the session is now complete
    pub session_complete: bool,
}

/// Running statistics for a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Answers submitted
    pub cards_reviewed: usize,
    /// Graded exactly correct
    pub correct: usize,
    /// Graded close (near-miss)
    pub close: usize,
    /// Graded partial or incorrect
    pub incorrect: usize,
    /// Never-before-seen cards reviewed
    pub new_cards_seen: usize,
    /// Total response time in milliseconds
    pub total_time_ms: i64,
    /// Rolling average response time in milliseconds
    pub average_time_ms: f64,
}

/// End-of-session summary (best effort: available at any point, so a
/// failing session still reports the reviews that committed)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// The session id
    pub session_id: String,
    /// The learner
    pub learner_id: String,
    /// Final statistics
    pub stats: SessionStats,
    /// Terms the learner struggled with this session
    pub struggling_terms: Vec<String>,
    /// Why the policy chose this session's limits
    pub limit_reasoning: String,
}

// ============================================================================
// SESSION
// ============================================================================

/// An active review session for one learner.
///
/// Owns its queue snapshot, cursor, context, and collaborator handles.
/// Performs no internal locking: callers serialize access per session id
/// (the registry's per-session mutex does exactly that).
pub struct ReviewSession {
    id: String,
    learner_id: String,
    queue: ReviewQueue,
    cards: Vec<Card>,
    cursor: usize,
    current: Option<SessionCard>,
    scheduler: FsrsScheduler,
    policy: AdaptivePolicy,
    decision: LimitDecision,
    ctx: SessionContext,
    stats: SessionStats,
    created_at: DateTime<Utc>,
    store: Arc<dyn CardStore>,
    exercises: Box<dyn ExerciseSource>,
    assessor: Box<dyn Assessor>,
}

impl ReviewSession {
    /// Assemble a session from an already-built queue.
    ///
    /// The queue is fixed for the session's lifetime; cards that become due
    /// afterwards wait for the next session.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        learner_id: impl Into<String>,
        queue: ReviewQueue,
        scheduler: FsrsScheduler,
        policy: AdaptivePolicy,
        decision: LimitDecision,
        ctx: SessionContext,
        store: Arc<dyn CardStore>,
        exercises: Box<dyn ExerciseSource>,
        assessor: Box<dyn Assessor>,
        now: DateTime<Utc>,
    ) -> Self {
        let cards = queue.interleaved();
        Self {
            id: Uuid::new_v4().to_string(),
            learner_id: learner_id.into(),
            queue,
            cards,
            cursor: 0,
            current: None,
            scheduler,
            policy,
            decision,
            ctx,
            stats: SessionStats::default(),
            created_at: now,
            store,
            exercises,
            assessor,
        }
    }

    /// Session id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The learner this session belongs to
    pub fn learner_id(&self) -> &str {
        &self.learner_id
    }

    /// The queue snapshot the session was built from
    pub fn queue(&self) -> &ReviewQueue {
        &self.queue
    }

    /// The policy decision that shaped this session
    pub fn decision(&self) -> &LimitDecision {
        &self.decision
    }

    /// Running statistics
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// The session-scoped learner context
    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// When the session was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Cards left to review, including the currently presented one
    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.cursor)
    }

    /// True once the cursor has passed the last card
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.cards.len()
    }

    /// Get the card and exercise to present next.
    ///
    /// Cards whose content has no presentable exercise are skipped with a
    /// warning rather than failing the call. Returns `None` once the
    /// session is complete. Calling again without submitting an answer
    /// returns the same presentation.
    pub fn get_next(&mut self) -> Result<Option<SessionCard>, SessionError> {
        if let Some(current) = &self.current {
            return Ok(Some(current.clone()));
        }

        loop {
            let Some(card) = self.cards.get(self.cursor).cloned() else {
                return Ok(None);
            };

            let hint = self.policy.difficulty_hint(&card, &self.ctx);
            match self.exercises.select(&card, hint.tier) {
                Some(exercise) => {
                    let presented = SessionCard { card, exercise };
                    self.current = Some(presented.clone());
                    return Ok(Some(presented));
                }
                None => {
                    tracing::warn!(card_id = %card.id, "Skipping card with no exercises");
                    self.cursor += 1;
                }
            }
        }
    }

    /// Submit an answer for the currently presented card.
    ///
    /// Validates identity and the optional self-rating before anything
    /// mutates; persists the new card state (whole-record replace) and the
    /// review outcome; then updates counters and advances the cursor.
    pub fn submit_answer(
        &mut self,
        submission: AnswerSubmission,
    ) -> Result<AnswerOutcome, SessionError> {
        let current = self
            .current
            .clone()
            .ok_or(SessionError::NothingPresented)?;

        if current.card.id != submission.card_id || current.exercise.id != submission.exercise_id {
            return Err(SessionError::IdentityMismatch {
                presented: format!("{}/{}", current.card.id, current.exercise.id),
                submitted: format!("{}/{}", submission.card_id, submission.exercise_id),
            });
        }

        let self_rating = submission
            .self_rating
            .map(|value| {
                Rating::from_i32(value).ok_or_else(|| {
                    SessionError::Validation(format!("self-rating out of range: {}", value))
                })
            })
            .transpose()?;

        let assessment = self
            .assessor
            .assess(&submission.response, &current.exercise)?;
        let applied_rating = self_rating.unwrap_or(assessment.suggested_rating);

        let now = Utc::now();
        let was_new = current.card.state.reps == 0;
        let review = if current.card.is_new() {
            let new_state = self.scheduler.initial_state(applied_rating, now);
            ReviewResult {
                interval_days: crate::fsrs::stability_to_interval(
                    new_state.stability,
                    self.scheduler.params().target_retention,
                ),
                retrievability: 1.0,
                new_state,
            }
        } else {
            self.scheduler
                .review(&current.card.state, applied_rating, now)?
        };

        // Persist first: card replace, then audit log. Session state only
        // moves after both succeed.
        let mut updated = current.card.clone();
        updated.state = review.new_state.clone();
        updated.updated_at = now;
        self.store.save_card(&updated)?;

        let outcome = ReviewOutcome {
            id: Uuid::new_v4().to_string(),
            card_id: current.card.id.clone(),
            learner_id: self.learner_id.clone(),
            exercise_kind: current.exercise.kind,
            rating: applied_rating.as_i32(),
            grade: assessment.grade.as_str().to_string(),
            time_ms: submission.time_ms,
            stability_before: current.card.state.stability,
            stability_after: review.new_state.stability,
            difficulty_before: current.card.state.difficulty,
            difficulty_after: review.new_state.difficulty,
            interval_days: review.interval_days,
            retrievability: review.retrievability,
            reviewed_at: now,
        };
        self.store.append_review_log(&outcome)?;

        self.stats.cards_reviewed += 1;
        self.stats.total_time_ms += submission.time_ms;
        self.stats.average_time_ms =
            self.stats.total_time_ms as f64 / self.stats.cards_reviewed as f64;
        if was_new {
            self.stats.new_cards_seen += 1;
        }
        match assessment.grade {
            Grade::Correct => self.stats.correct += 1,
            Grade::Close => self.stats.close += 1,
            Grade::Partial | Grade::Incorrect => self.stats.incorrect += 1,
        }

        self.ctx.record_review(ReviewEvent {
            card_id: current.card.id.clone(),
            term: current.card.term.clone(),
            exercise_kind: current.exercise.kind,
            rating: applied_rating,
            grade: assessment.grade,
            time_ms: submission.time_ms,
            timestamp: now,
        });

        self.cursor += 1;
        self.current = None;

        Ok(AnswerOutcome {
            assessment,
            applied_rating,
            review,
            remaining: self.remaining(),
            session_complete: self.is_complete(),
        })
    }

    /// Summary of the session so far
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id.clone(),
            learner_id: self.learner_id.clone(),
            stats: self.stats.clone(),
            struggling_terms: self.ctx.struggling_terms.clone(),
            limit_reasoning: self.decision.reasoning.clone(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
